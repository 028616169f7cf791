//! HTTP server exposing the push relay
//!
//! Thin axum layer over the registry and dispatcher: JSON in, JSON out,
//! permissive CORS so panels hosted elsewhere can call it.

pub mod error;
pub mod routes;
pub mod state;
mod static_files;

pub use error::ApiError;
pub use state::ServerAppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use routes::push_routes;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the router with all routes and layers applied
pub fn build_router(state: ServerAppState, cors_origins: Option<&[String]>) -> Router {
    let cors = match cors_origins {
        Some(origins) if !origins.is_empty() => {
            // Restricted CORS: only allow specified origins
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(allowed_origins)
        }
        _ => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/health", get(push_routes::health_handler))
        .route("/api/subscribers", get(push_routes::subscribers_handler))
        .route("/api/subscribe", post(push_routes::subscribe_handler))
        .route("/api/send", post(push_routes::send_handler))
        .route("/api/send-test", get(push_routes::send_test_handler))
        .route(
            "/api/vapid-public-key",
            get(push_routes::vapid_public_key_handler),
        );

    // Serve the embedded panel if available, otherwise a plain banner
    if static_files::has_embedded_panel() {
        app = app.fallback(static_files::serve_static);
    } else {
        app = app.route("/", get(index_handler));
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until a shutdown is requested
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = match &cors_origins {
        Some(origins) if !origins.is_empty() => origins.join(", "),
        _ => "*".to_string(),
    };
    let vapid_display = if state.vapid_ready() { "ready" } else { "NOT CONFIGURED" };

    println!("\n  Push relay");
    println!("    Server URL:    http://{}:{}", bind, port);
    println!("    VAPID:         {}", vapid_display);
    println!("    CORS Origins:  {}", cors_display);
    println!("    Endpoints:");
    println!("      GET  /health");
    println!("      GET  /api/subscribers");
    println!("      POST /api/subscribe");
    println!("      POST /api/send");
    println!("      GET  /api/send-test");
    println!("      GET  /api/vapid-public-key\n");

    let shutdown_state = state.shutdown_state.clone();
    let app = build_router(state, cors_origins.as_deref());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown_signal = async move {
        shutdown_state.wait().await;
        log::info!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Index handler used when no panel is embedded
async fn index_handler() -> &'static str {
    "push relay OK"
}
