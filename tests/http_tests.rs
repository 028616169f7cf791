// Integration tests for the HTTP surface: registration, fan-out and cleanup

mod common;

use axum::http::StatusCode;
use common::{ready_app, unconfigured_app};
use push_relay::push::SubscriptionStore;
use serde_json::json;

#[tokio::test]
async fn test_health_reports_readiness_and_count() {
    let app = ready_app();
    app.subscribe("https://push.example.com/a").await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "vapidReady": true, "subs": 1 }));

    let (_, body) = unconfigured_app().get("/health").await;
    assert_eq!(body["vapidReady"], json!(false));
}

#[tokio::test]
async fn test_subscribe_is_idempotent() {
    let app = ready_app();

    let (status, body) = app.subscribe("https://push.example.com/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "total": 1 }));

    let (status, body) = app.subscribe("https://push.example.com/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "total": 1 }));

    let (_, body) = app.get("/api/subscribers").await;
    assert_eq!(body, json!({ "total": 1 }));
}

#[tokio::test]
async fn test_subscribe_without_endpoint_is_rejected() {
    let app = ready_app();
    app.subscribe("https://push.example.com/a").await;

    for body in [
        r#"{"subscription":{"keys":{"auth":"x"}}}"#,
        r#"{"subscription":{"endpoint":""}}"#,
        r#"{}"#,
        "",
        "not json",
    ] {
        let (status, response) = app.post("/api/subscribe", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response["ok"], json!(false));
        assert!(response["error"].is_string());
    }

    assert_eq!(app.store.count().await, 1);
}

#[tokio::test]
async fn test_subscribe_accepts_any_keys_shape() {
    let app = ready_app();

    let (status, body) = app
        .post("/api/subscribe", r#"{"subscription":{"endpoint":"E","keys":null}}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "total": 1 }));

    let (status, body) = app
        .post(
            "/api/subscribe",
            r#"{"subscription":{"endpoint":"F","keys":{"p256dh":1,"auth":["a"],"extra":null}}}"#,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "total": 2 }));

    let snapshot = app.store.snapshot().await;
    assert!(snapshot[0].keys.is_empty());
    assert_eq!(snapshot[1].keys["auth"], json!(["a"]));
    assert_eq!(snapshot[1].key("p256dh"), None);
}

#[tokio::test]
async fn test_send_removes_gone_endpoint() {
    let app = ready_app();
    for endpoint in ["A", "B", "C"] {
        app.subscribe(endpoint).await;
    }
    app.delivery.fail("B", 410);

    let (status, body) = app.post("/api/send", r#"{"title":"Hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["success"], json!(2));
    assert_eq!(body["failed"], json!(1));
    assert_eq!(body["total"], json!(2));

    let failure = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["endpoint"] == json!("B"))
        .unwrap()
        .clone();
    assert_eq!(failure["ok"], json!(false));
    assert_eq!(failure["status"], json!(410));

    let remaining: Vec<String> = app
        .store
        .snapshot()
        .await
        .into_iter()
        .map(|s| s.endpoint)
        .collect();
    assert_eq!(remaining, vec!["A".to_string(), "C".to_string()]);
}

#[tokio::test]
async fn test_send_keeps_endpoint_on_server_error() {
    let app = ready_app();
    app.subscribe("A").await;
    app.delivery.fail("A", 500);

    let (status, body) = app.post("/api/send", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(0));
    assert_eq!(body["failed"], json!(1));
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["details"][0]["status"], json!(500));
    assert_eq!(body["details"][0]["msg"], json!("push service returned 500"));
}

#[tokio::test]
async fn test_send_counts_add_up_with_mixed_failures() {
    let app = ready_app();
    for i in 0..10 {
        app.subscribe(&format!("https://push.example.com/{}", i)).await;
    }
    app.delivery.fail("https://push.example.com/1", 404);
    app.delivery.fail("https://push.example.com/2", 0);
    app.delivery.fail("https://push.example.com/3", 429);

    let (_, body) = app.post("/api/send", "").await;
    let success = body["success"].as_u64().unwrap();
    let failed = body["failed"].as_u64().unwrap();

    assert_eq!(success + failed, 10);
    assert_eq!(failed, 3);
    assert_eq!(body["total"], json!(9));
    assert_eq!(body["details"].as_array().unwrap().len(), 10);
    assert_eq!(app.delivery.calls(), 10);
}

#[tokio::test]
async fn test_send_with_empty_registry() {
    let app = ready_app();

    let (status, body) = app.post("/api/send", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "ok": true, "success": 0, "failed": 0, "total": 0, "details": [] })
    );
    assert_eq!(app.delivery.calls(), 0);
}

#[tokio::test]
async fn test_send_when_unconfigured() {
    let app = unconfigured_app();
    app.subscribe("A").await;

    let (status, body) = app.post("/api/send", "{}").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "ok": false, "status": 500, "error": "push delivery not configured" })
    );
    assert_eq!(app.store.count().await, 1);

    let (status, _) = app.get("/api/send-test").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.get("/api/vapid-public-key").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_send_payload_defaults_and_trimming() {
    let app = ready_app();
    app.subscribe("A").await;

    app.post("/api/send", r#"{"title":"  Flash sale  ","body":""}"#)
        .await;

    let payloads = app.delivery.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["title"], json!("Flash sale"));
    assert_eq!(payloads[0]["body"], json!("You received a new message."));
    assert!(payloads[0]["url"].is_string());
    assert!(payloads[0]["icon"].is_string());
}

#[tokio::test]
async fn test_send_test_uses_demo_payload() {
    let app = ready_app();
    app.subscribe("A").await;

    let (status, body) = app.get("/api/send-test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(1));

    let payloads = app.delivery.payloads();
    let title = payloads[0]["title"].as_str().unwrap();
    let message = payloads[0]["body"].as_str().unwrap();
    assert!(title.starts_with("default sender name"));
    assert!(message.starts_with("Test notification - "));
}

#[tokio::test]
async fn test_vapid_public_key() {
    let app = ready_app();
    let (status, body) = app.get("/api/vapid-public-key").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "publicKey": "test-public-key" }));
}
