//! Fan-out of one notification to every registered subscription

use super::error::PushError;
use super::registry::SubscriptionStore;
use super::sender::PushDelivery;
use super::types::{
    is_gone_status, DeliveryOutcome, DispatchReport, NotificationPayload, NotificationRequest,
    PayloadDefaults, PushSubscription,
};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

/// Sends notifications to all subscriptions and prunes dead endpoints
pub struct Dispatcher {
    store: Arc<dyn SubscriptionStore>,
    /// `None` when VAPID credentials were missing or invalid at startup
    delivery: Option<Arc<dyn PushDelivery>>,
    defaults: PayloadDefaults,
    /// Maximum deliveries in flight during one send
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        delivery: Option<Arc<dyn PushDelivery>>,
        defaults: PayloadDefaults,
    ) -> Self {
        Self {
            store,
            delivery,
            defaults,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` deliveries at once (1 = sequential)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Whether a delivery capability was configured at startup
    pub fn is_ready(&self) -> bool {
        self.delivery.is_some()
    }

    pub fn defaults(&self) -> &PayloadDefaults {
        &self.defaults
    }

    pub fn store(&self) -> &Arc<dyn SubscriptionStore> {
        &self.store
    }

    /// Deliver a notification to every subscription in the registry.
    ///
    /// Works from a snapshot taken at the start, so registrations or removals
    /// during the send do not change who gets the message. Failures are
    /// folded into the report; 404 and 410 responses remove the endpoint.
    pub async fn send_to_all(
        &self,
        request: &NotificationRequest,
    ) -> Result<DispatchReport, PushError> {
        let Some(delivery) = self.delivery.as_ref() else {
            return Err(PushError::NotConfigured);
        };

        let subscriptions = self.store.snapshot().await;
        if subscriptions.is_empty() {
            log::debug!("No push subscriptions, skipping notification");
            return Ok(DispatchReport::empty());
        }

        let payload = NotificationPayload::resolve(request, &self.defaults);
        let payload_json = serde_json::to_vec(&payload)
            .map_err(|e| PushError::Internal(format!("Failed to serialize payload: {}", e)))?;

        let mut success = 0;
        let mut failed = 0;
        let mut removed = 0;
        let mut details = Vec::with_capacity(subscriptions.len());

        let payload_ref = payload_json.as_slice();
        let mut attempts = stream::iter(subscriptions)
            .map(|subscription| {
                let delivery = delivery.clone();
                async move { attempt(&*delivery, &subscription, payload_ref).await }
            })
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = attempts.next().await {
            if outcome.ok {
                success += 1;
                log::debug!("Sent push notification to {}", outcome.endpoint);
            } else {
                failed += 1;
                let status = outcome.status.unwrap_or(0);
                log::warn!(
                    "Push delivery to {} failed: {} {}",
                    outcome.endpoint,
                    status,
                    outcome.msg.as_deref().unwrap_or_default()
                );

                if is_gone_status(status)
                    && self.store.remove_by_endpoint(&outcome.endpoint).await
                {
                    log::info!("Removed expired subscription {}", outcome.endpoint);
                    removed += 1;
                }
            }
            details.push(outcome);
        }

        let total = self.store.count().await;

        log::info!(
            "Push notification result: {} sent, {} failed, {} removed, {} remaining",
            success,
            failed,
            removed,
            total
        );

        Ok(DispatchReport {
            ok: true,
            success,
            failed,
            total,
            details,
        })
    }
}

/// One delivery attempt, classified into an outcome
async fn attempt(
    delivery: &dyn PushDelivery,
    subscription: &PushSubscription,
    payload: &[u8],
) -> DeliveryOutcome {
    match delivery.deliver(subscription, payload).await {
        Ok(()) => DeliveryOutcome::delivered(subscription.endpoint.as_str()),
        Err(e) => DeliveryOutcome::failed(
            subscription.endpoint.as_str(),
            e.status_code(),
            e.message,
        ),
    }
}
