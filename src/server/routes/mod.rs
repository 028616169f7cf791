//! Route handlers
//!
//! - push_routes: subscription registry and notification fan-out

pub mod push_routes;

use super::error::ApiError;
use serde::de::DeserializeOwned;

/// Parse a JSON request body, treating an empty body as `{}`
pub fn parse_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| ApiError::InvalidInput(format!("Invalid JSON body: {}", e)))
}
