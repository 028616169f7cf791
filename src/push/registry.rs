//! Subscription registry
//!
//! The registry lives in process memory only. It sits behind the
//! [`SubscriptionStore`] trait so a persistent store can replace it without
//! touching the dispatcher.

use super::error::PushError;
use super::types::PushSubscription;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Result of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// False when the endpoint was already known
    pub inserted: bool,
    /// Number of stored subscriptions after the call
    pub total: usize,
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a subscription unless its endpoint is already stored.
    ///
    /// A known endpoint keeps its first-seen keys.
    async fn register(&self, subscription: PushSubscription) -> Result<Registration, PushError>;

    /// Number of stored subscriptions
    async fn count(&self) -> usize;

    /// Remove the subscription with this exact endpoint, if any
    async fn remove_by_endpoint(&self, endpoint: &str) -> bool;

    /// Point-in-time copy of every stored subscription, in insertion order
    async fn snapshot(&self) -> Vec<PushSubscription>;
}

/// Registry kept in a `Vec` guarded by an async `RwLock`
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<Vec<PushSubscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn register(&self, subscription: PushSubscription) -> Result<Registration, PushError> {
        if !subscription.has_endpoint() {
            return Err(PushError::InvalidSubscription);
        }

        // Existence check and insert under one write lock
        let mut subscriptions = self.subscriptions.write().await;
        let exists = subscriptions
            .iter()
            .any(|s| s.endpoint == subscription.endpoint);

        if exists {
            log::debug!("Subscription already registered: {}", subscription.endpoint);
        } else {
            log::info!("New subscriber: {}", subscription.endpoint);
            subscriptions.push(subscription);
        }

        Ok(Registration {
            inserted: !exists,
            total: subscriptions.len(),
        })
    }

    async fn count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    async fn remove_by_endpoint(&self, endpoint: &str) -> bool {
        let mut subscriptions = self.subscriptions.write().await;
        let before = subscriptions.len();
        subscriptions.retain(|s| s.endpoint != endpoint);
        subscriptions.len() < before
    }

    async fn snapshot(&self) -> Vec<PushSubscription> {
        self.subscriptions.read().await.clone()
    }
}
