//! Minimal Web Push fan-out server.
//!
//! Browsers register push subscriptions over HTTP; a send request delivers
//! one notification to every registered subscription, reports per-endpoint
//! results and drops endpoints the push service reports as gone.

// Module declarations
pub mod config;
pub mod push;
pub mod shutdown;

// Server module (HTTP API)
pub mod server;

pub use config::ServerConfig;

use push::{Dispatcher, InMemorySubscriptionStore, PushDelivery, WebPushSender};
use shutdown::ShutdownState;
use std::sync::Arc;

/// Wire the registry, the delivery capability and the dispatcher from configuration.
///
/// VAPID credentials are checked here, once. When they are missing or
/// invalid the server still starts, but reports `vapidReady: false` and
/// refuses to send for the rest of its life.
pub fn build_state(config: &ServerConfig, shutdown_state: ShutdownState) -> server::ServerAppState {
    let store = Arc::new(InMemorySubscriptionStore::new());

    let (delivery, public_key): (Option<Arc<dyn PushDelivery>>, Option<String>) =
        match config.vapid_credentials() {
            Ok(credentials) => {
                let public_key = credentials.public_key().to_string();
                match WebPushSender::new(credentials, config.sender_options()) {
                    Ok(sender) => {
                        log::info!("VAPID configured");
                        (Some(Arc::new(sender) as Arc<dyn PushDelivery>), Some(public_key))
                    }
                    Err(e) => {
                        log::error!("Failed to create push HTTP client: {}", e);
                        (None, None)
                    }
                }
            }
            Err(e) => {
                log::warn!("VAPID not configured, push delivery disabled: {}", e);
                (None, None)
            }
        };

    let dispatcher = Dispatcher::new(store, delivery, config.payload_defaults())
        .with_concurrency(config.concurrency);

    server::ServerAppState::new(dispatcher, public_key, shutdown_state)
}
