// Error types for the push fan-out

use super::types::is_gone_status;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid subscription: endpoint is required")]
    InvalidSubscription,

    #[error("push delivery not configured")]
    NotConfigured,

    #[error("{0}")]
    Internal(String),
}

/// Failure reported by the delivery layer for one subscription.
///
/// `status` is the HTTP status the push service answered with, when the
/// request got that far.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeliveryError {
    pub status: Option<u16>,
    pub message: String,
}

impl DeliveryError {
    /// A push service response with a non-success status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A failure before any response arrived (encryption, network, timeout)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Status code to report, 0 when none was received
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    /// Whether the push service confirmed the endpoint is permanently gone
    pub fn is_gone(&self) -> bool {
        is_gone_status(self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_defaults_to_zero() {
        assert_eq!(DeliveryError::transport("timed out").status_code(), 0);
        assert_eq!(DeliveryError::http(503, "busy").status_code(), 503);
    }

    #[test]
    fn test_is_gone() {
        assert!(DeliveryError::http(410, "").is_gone());
        assert!(DeliveryError::http(404, "").is_gone());
        assert!(!DeliveryError::http(429, "").is_gone());
        assert!(!DeliveryError::transport("connection reset").is_gone());
    }

    #[test]
    fn test_display_uses_message() {
        assert_eq!(DeliveryError::http(500, "boom").to_string(), "boom");
        assert_eq!(PushError::NotConfigured.to_string(), "push delivery not configured");
    }
}
