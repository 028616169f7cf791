//! Push delivery
//!
//! Encrypts (RFC 8291) and signs (RFC 8292) a message with the `web-push`
//! crate, then posts it to the push service with reqwest so the raw HTTP
//! status and body are available to classify failures.

use super::error::DeliveryError;
use super::types::PushSubscription;
use super::vapid::VapidCredentials;
use async_trait::async_trait;
use std::time::Duration;
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

/// Delivers one payload to one subscription
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DeliveryError>;
}

/// Settings for the HTTP side of delivery
#[derive(Debug, Clone)]
pub struct SenderOptions {
    /// Upper bound for a single request to the push service
    pub timeout: Duration,
    /// How long the push service should keep an undelivered message
    pub ttl: u32,
}

impl Default for SenderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            ttl: 86400,
        }
    }
}

/// Web Push sender backed by a pooled reqwest client
pub struct WebPushSender {
    client: reqwest::Client,
    credentials: VapidCredentials,
    ttl: u32,
}

impl WebPushSender {
    pub fn new(credentials: VapidCredentials, options: SenderOptions) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            credentials,
            ttl: options.ttl,
        })
    }

    fn build_request(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<reqwest::RequestBuilder, DeliveryError> {
        let (Some(p256dh), Some(auth)) = (subscription.key("p256dh"), subscription.key("auth")) else {
            return Err(DeliveryError::transport(
                "subscription is missing p256dh or auth key",
            ));
        };

        let subscription_info = SubscriptionInfo::new(subscription.endpoint.as_str(), p256dh, auth);

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(self.credentials.private_key(), &subscription_info)
                .map_err(|e| {
                    DeliveryError::transport(format!("Failed to create VAPID signature builder: {}", e))
                })?;
        sig_builder.add_claim("sub", self.credentials.subject());
        let signature = sig_builder
            .build()
            .map_err(|e| DeliveryError::transport(format!("Failed to build VAPID signature: {}", e)))?;

        let mut builder = WebPushMessageBuilder::new(&subscription_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl);

        let message = builder
            .build()
            .map_err(|e| DeliveryError::transport(format!("Failed to build push message: {}", e)))?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }

        if let Some(topic) = message.topic {
            request = request.header("Topic", topic);
        }

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        } else {
            request = request.header("Content-Length", "0");
        }

        Ok(request)
    }
}

#[async_trait]
impl PushDelivery for WebPushSender {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        let request = self.build_request(subscription, payload)?;

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::transport(describe_transport_error(&e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the push service's own explanation, fall back to the reason phrase
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        } else {
            body.trim().to_string()
        };

        Err(DeliveryError::http(status.as_u16(), message))
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Push service request timed out: {}", error)
    } else if error.is_connect() {
        format!("Failed to connect to push service: {}", error)
    } else {
        format!("Web push HTTP request failed: {}", error)
    }
}
