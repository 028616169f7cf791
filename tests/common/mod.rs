// Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use push_relay::push::{
    DeliveryError, Dispatcher, InMemorySubscriptionStore, PayloadDefaults, PushDelivery,
    PushSubscription,
};
use push_relay::server::{build_router, ServerAppState};
use push_relay::shutdown::ShutdownState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Delivery double: endpoints listed in `failures` fail with that status
/// (0 meaning a transport error with no status), everything else succeeds.
#[derive(Default)]
pub struct ScriptedDelivery {
    failures: Mutex<HashMap<String, u16>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<Value>>,
}

impl ScriptedDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, endpoint: &str, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), status);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for ScriptedDelivery {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(value) = serde_json::from_slice(payload) {
            self.payloads.lock().unwrap().push(value);
        }

        let failure = self.failures.lock().unwrap().get(&subscription.endpoint).copied();
        match failure {
            Some(0) => Err(DeliveryError::transport("connection reset by peer")),
            Some(status) => Err(DeliveryError::http(status, format!("push service returned {}", status))),
            None => Ok(()),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySubscriptionStore>,
    pub delivery: Arc<ScriptedDelivery>,
}

/// App with a working (scripted) delivery capability
pub fn ready_app() -> TestApp {
    build_app(true)
}

/// App whose VAPID configuration was missing at startup
pub fn unconfigured_app() -> TestApp {
    build_app(false)
}

fn build_app(configured: bool) -> TestApp {
    let store = Arc::new(InMemorySubscriptionStore::new());
    let delivery = Arc::new(ScriptedDelivery::new());

    let capability: Option<Arc<dyn PushDelivery>> = if configured {
        Some(delivery.clone())
    } else {
        None
    };
    let public_key = configured.then(|| "test-public-key".to_string());

    let dispatcher = Dispatcher::new(store.clone(), capability, PayloadDefaults::default())
        .with_concurrency(4);
    let state = ServerAppState::new(dispatcher, public_key, ShutdownState::new());

    TestApp {
        router: build_router(state, None),
        store,
        delivery,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.call(request).await
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(request).await
    }

    pub async fn subscribe(&self, endpoint: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "subscription": {
                "endpoint": endpoint,
                "keys": { "p256dh": "test-p256dh", "auth": "test-auth" }
            }
        });
        self.post("/api/subscribe", &body.to_string()).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
