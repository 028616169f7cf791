//! Push routes
//!
//! Handles: GET /health, GET /api/subscribers, POST /api/subscribe,
//! POST /api/send, GET /api/send-test, GET /api/vapid-public-key

use super::parse_json_body;
use crate::push::{DispatchReport, NotificationRequest, PushSubscription};
use crate::server::error::ApiError;
use crate::server::ServerAppState;
use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

/// Body of POST /api/subscribe
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub subscription: Option<PushSubscription>,
}

/// Readiness and subscriber count
pub async fn health_handler(State(state): State<ServerAppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "vapidReady": state.vapid_ready(),
        "subs": state.store.count().await,
    }))
}

pub async fn subscribers_handler(State(state): State<ServerAppState>) -> Json<Value> {
    Json(json!({ "total": state.store.count().await }))
}

pub async fn subscribe_handler(
    State(state): State<ServerAppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: SubscribeRequest = parse_json_body(&body)?;
    let subscription = request
        .subscription
        .ok_or_else(|| ApiError::InvalidInput("invalid subscription".to_string()))?;

    let registration = state.store.register(subscription).await?;

    Ok(Json(json!({ "ok": true, "total": registration.total })))
}

pub async fn send_handler(
    State(state): State<ServerAppState>,
    body: Bytes,
) -> Result<Json<DispatchReport>, ApiError> {
    let request: NotificationRequest = parse_json_body(&body)?;
    let report = state.dispatcher.send_to_all(&request).await?;
    Ok(Json(report))
}

/// Fixed demo notification, handy to trigger from a browser address bar
pub async fn send_test_handler(
    State(state): State<ServerAppState>,
) -> Result<Json<DispatchReport>, ApiError> {
    let request = test_notification(&state);
    let report = state.dispatcher.send_to_all(&request).await?;
    Ok(Json(report))
}

pub async fn vapid_public_key_handler(
    State(state): State<ServerAppState>,
) -> Result<Json<Value>, ApiError> {
    let public_key = state
        .vapid_public_key
        .as_deref()
        .ok_or(ApiError::ServiceUnconfigured)?;
    Ok(Json(json!({ "ok": true, "publicKey": public_key })))
}

fn test_notification(state: &ServerAppState) -> NotificationRequest {
    let defaults = state.dispatcher.defaults();
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    NotificationRequest {
        title: Some(format!("{} ✅", defaults.title)),
        body: Some(format!("Test notification - {}", now)),
        url: Some(defaults.url.clone()),
        icon: Some(defaults.icon.clone()),
    }
}
