//! Web Push fan-out
//!
//! Keeps browser subscriptions in a registry and broadcasts notifications to
//! all of them, dropping endpoints the push service reports as gone.

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod sender;
pub mod types;
pub mod vapid;

pub use dispatcher::Dispatcher;
pub use error::{DeliveryError, PushError};
pub use registry::{InMemorySubscriptionStore, Registration, SubscriptionStore};
pub use sender::{PushDelivery, SenderOptions, WebPushSender};
pub use types::{
    DeliveryOutcome, DispatchReport, NotificationPayload, NotificationRequest, PayloadDefaults,
    PushSubscription, PushSubscriptionKeys,
};
pub use vapid::{generate_vapid_keys, VapidCredentials, VapidError, VapidKeyPair};
