//! Server configuration
//!
//! Every option can be given as a flag or through the environment. A `.env`
//! file in the working directory is loaded before parsing.

use crate::push::{PayloadDefaults, SenderOptions, VapidCredentials, VapidError};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,

    /// VAPID public key (base64url, uncompressed P-256 point)
    #[arg(long, env = "VAPID_PUBLIC_KEY")]
    pub vapid_public_key: Option<String>,

    /// VAPID private key (base64url, raw P-256 scalar)
    #[arg(long, env = "VAPID_PRIVATE_KEY", hide_env_values = true)]
    pub vapid_private_key: Option<String>,

    /// Contact sent to push services with every request
    #[arg(long, env = "VAPID_SUBJECT", default_value = "mailto:admin@example.com")]
    pub vapid_subject: String,

    /// Comma-separated list of allowed CORS origins (any origin when unset)
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Notification title used when a send request has none
    #[arg(long, env = "PUSH_DEFAULT_TITLE", default_value = "default sender name")]
    pub default_title: String,

    /// Notification body used when a send request has none
    #[arg(long, env = "PUSH_DEFAULT_BODY", default_value = "You received a new message.")]
    pub default_body: String,

    /// Landing URL opened when the notification is clicked
    #[arg(long, env = "PUSH_DEFAULT_URL", default_value = "https://example.com/?pwa=true")]
    pub default_url: String,

    /// Icon shown with the notification
    #[arg(long, env = "PUSH_DEFAULT_ICON", default_value = "https://example.com/icon.png")]
    pub default_icon: String,

    /// Timeout for a single request to a push service
    #[arg(long, env = "PUSH_DELIVERY_TIMEOUT_SECS", default_value = "10")]
    pub delivery_timeout_secs: u64,

    /// How long push services keep an undelivered message
    #[arg(long, env = "PUSH_TTL_SECS", default_value = "86400")]
    pub push_ttl_secs: u32,

    /// Deliveries in flight during one send (1 = sequential)
    #[arg(long, env = "PUSH_CONCURRENCY", default_value = "8")]
    pub concurrency: usize,
}

impl ServerConfig {
    pub fn payload_defaults(&self) -> PayloadDefaults {
        PayloadDefaults {
            title: self.default_title.trim().to_string(),
            body: self.default_body.trim().to_string(),
            url: self.default_url.trim().to_string(),
            icon: self.default_icon.trim().to_string(),
        }
    }

    pub fn sender_options(&self) -> SenderOptions {
        SenderOptions {
            timeout: Duration::from_secs(self.delivery_timeout_secs.max(1)),
            ttl: self.push_ttl_secs,
        }
    }

    /// Validate the VAPID settings, done once at startup
    pub fn vapid_credentials(&self) -> Result<VapidCredentials, VapidError> {
        VapidCredentials::from_config(
            self.vapid_public_key.as_deref(),
            self.vapid_private_key.as_deref(),
            &self.vapid_subject,
        )
    }

    /// Allowed origins with blanks removed, `None` meaning any origin
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .iter()
            .flatten()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty() && o != "*")
            .collect();

        if origins.is_empty() {
            None
        } else {
            Some(origins)
        }
    }
}
