//! Server application state shared across handlers

use crate::push::{Dispatcher, SubscriptionStore};
use crate::shutdown::ShutdownState;
use std::sync::Arc;

/// Shared state for the server: the registry, the dispatcher driving it, and
/// the readiness facts computed once at startup.
#[derive(Clone)]
pub struct ServerAppState {
    /// Subscription registry
    pub store: Arc<dyn SubscriptionStore>,

    /// Fan-out over the registry
    pub dispatcher: Arc<Dispatcher>,

    /// VAPID public key for browser clients, `None` when delivery is not configured
    pub vapid_public_key: Option<String>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(
        dispatcher: Dispatcher,
        vapid_public_key: Option<String>,
        shutdown_state: ShutdownState,
    ) -> Self {
        Self {
            store: dispatcher.store().clone(),
            dispatcher: Arc::new(dispatcher),
            vapid_public_key,
            shutdown_state,
        }
    }

    /// Whether push delivery was configured at startup
    pub fn vapid_ready(&self) -> bool {
        self.dispatcher.is_ready()
    }
}
