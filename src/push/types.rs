//! Types for push subscriptions and fan-out reports

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status codes a push service uses to say an endpoint is gone for good
const GONE_STATUSES: [u16; 2] = [404, 410];

/// Keys for a push subscription (from browser)
///
/// Kept opaque: usually `p256dh` and `auth`, but whatever the browser sends
/// is stored and handed to the delivery layer untouched.
pub type PushSubscriptionKeys = Map<String, Value>;

/// A browser push subscription, identified by its endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// The push endpoint URL
    #[serde(default)]
    pub endpoint: String,
    /// Encryption keys
    #[serde(default, deserialize_with = "keys_or_empty")]
    pub keys: PushSubscriptionKeys,
}

impl PushSubscription {
    pub fn new(endpoint: impl Into<String>, keys: PushSubscriptionKeys) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys,
        }
    }

    /// Look up one of the opaque key entries, if it is a string
    pub fn key(&self, name: &str) -> Option<&str> {
        self.keys.get(name).and_then(Value::as_str)
    }

    /// A subscription without an endpoint can never be delivered to
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

/// `keys: null` is stored as an empty map
fn keys_or_empty<'de, D>(deserializer: D) -> Result<PushSubscriptionKeys, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PushSubscriptionKeys>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fallback values used when a send request leaves a field empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDefaults {
    pub title: String,
    pub body: String,
    pub url: String,
    pub icon: String,
}

impl Default for PayloadDefaults {
    fn default() -> Self {
        Self {
            title: "default sender name".to_string(),
            body: "You received a new message.".to_string(),
            url: "https://example.com/?pwa=true".to_string(),
            icon: "https://example.com/icon.png".to_string(),
        }
    }
}

/// Notification fields as requested by the caller, all optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Payload delivered to the service worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    pub icon: String,
}

impl NotificationPayload {
    /// Resolve a request against the defaults.
    ///
    /// A non-empty explicit value wins over the default, and whichever is
    /// chosen gets trimmed. An explicit value made only of whitespace is
    /// non-empty, so it resolves to an empty string.
    pub fn resolve(request: &NotificationRequest, defaults: &PayloadDefaults) -> Self {
        Self {
            title: pick(request.title.as_deref(), &defaults.title),
            body: pick(request.body.as_deref(), &defaults.body),
            url: pick(request.url.as_deref(), &defaults.url),
            icon: pick(request.icon.as_deref(), &defaults.icon),
        }
    }
}

fn pick(explicit: Option<&str>, default: &str) -> String {
    match explicit {
        Some(value) if !value.is_empty() => value.trim().to_string(),
        _ => default.trim().to_string(),
    }
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub endpoint: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ok: true,
            status: None,
            msg: None,
        }
    }

    pub fn failed(endpoint: impl Into<String>, status: u16, msg: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ok: false,
            status: Some(status),
            msg: Some(msg.into()),
        }
    }
}

/// Aggregated result of a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub ok: bool,
    pub success: usize,
    pub failed: usize,
    /// Registry size after any cleanup this send performed
    pub total: usize,
    pub details: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn empty() -> Self {
        Self {
            ok: true,
            success: 0,
            failed: 0,
            total: 0,
            details: Vec::new(),
        }
    }
}

/// Whether a push service status means the endpoint will never accept deliveries again
pub fn is_gone_status(status: u16) -> bool {
    GONE_STATUSES.contains(&status)
}
