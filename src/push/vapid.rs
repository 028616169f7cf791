//! VAPID (Voluntary Application Server Identification) credentials
//!
//! The server signs every push request with a P-256 keypair. Keys come from
//! configuration and are validated once at startup; a process that starts
//! with missing or malformed keys stays not-ready for its whole lifetime.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::ecdsa::SigningKey;
use std::fmt;
use thiserror::Error;

/// Length of an uncompressed SEC1 P-256 point (0x04 || x || y)
const PUBLIC_KEY_LEN: usize = 65;
/// Length of a raw P-256 private scalar
const PRIVATE_KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VapidError {
    #[error("VAPID public and private keys are required")]
    MissingKeys,

    #[error("invalid VAPID public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid VAPID private key: {0}")]
    InvalidPrivateKey(String),

    #[error("VAPID public key does not belong to the private key")]
    KeyMismatch,
}

/// Validated signing credentials, shared by every delivery
#[derive(Clone)]
pub struct VapidCredentials {
    /// Base64url public key, handed to browsers as `applicationServerKey`
    public_key: String,
    /// Base64url raw private scalar, the format `web-push` signs with
    private_key: String,
    /// Contact identifier (`mailto:` or `https:` URL) sent as the `sub` claim
    subject: String,
}

impl VapidCredentials {
    /// Validate credentials read from configuration.
    ///
    /// Both keys must be present, decode as base64url, have the right
    /// length, and form a matching P-256 keypair.
    pub fn from_config(
        public_key: Option<&str>,
        private_key: Option<&str>,
        subject: &str,
    ) -> Result<Self, VapidError> {
        let public_key = public_key.map(str::trim).filter(|k| !k.is_empty());
        let private_key = private_key.map(str::trim).filter(|k| !k.is_empty());

        let (Some(public_key), Some(private_key)) = (public_key, private_key) else {
            return Err(VapidError::MissingKeys);
        };

        let public_bytes = decode_base64url(public_key).map_err(VapidError::InvalidPublicKey)?;
        if public_bytes.len() != PUBLIC_KEY_LEN || public_bytes[0] != 0x04 {
            return Err(VapidError::InvalidPublicKey(format!(
                "expected a {}-byte uncompressed P-256 point, got {} bytes",
                PUBLIC_KEY_LEN,
                public_bytes.len()
            )));
        }

        let private_bytes =
            decode_base64url(private_key).map_err(VapidError::InvalidPrivateKey)?;
        if private_bytes.len() != PRIVATE_KEY_LEN {
            return Err(VapidError::InvalidPrivateKey(format!(
                "expected a {}-byte P-256 scalar, got {} bytes",
                PRIVATE_KEY_LEN,
                private_bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(&private_bytes)
            .map_err(|e| VapidError::InvalidPrivateKey(e.to_string()))?;

        let derived = signing_key.verifying_key().to_encoded_point(false);
        if derived.as_bytes() != public_bytes.as_slice() {
            return Err(VapidError::KeyMismatch);
        }

        let subject = subject.trim();
        if !subject.starts_with("mailto:") && !subject.starts_with("https:") {
            log::warn!(
                "VAPID subject '{}' is neither a mailto: nor an https: URL; push services may reject it",
                subject
            );
        }

        Ok(Self {
            public_key: URL_SAFE_NO_PAD.encode(&public_bytes),
            private_key: URL_SAFE_NO_PAD.encode(&private_bytes),
            subject: subject.to_string(),
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Debug for VapidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidCredentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

/// Freshly generated keypair, both halves base64url without padding
#[derive(Debug, Clone)]
pub struct VapidKeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generate a new VAPID key pair using P-256 curve
pub fn generate_vapid_keys() -> VapidKeyPair {
    use rand::rngs::OsRng;

    let signing_key = SigningKey::random(&mut OsRng);

    // Raw 32-byte scalar
    let private_key = URL_SAFE_NO_PAD.encode(signing_key.to_bytes());

    // Uncompressed point, 65 bytes
    let public_point = signing_key.verifying_key().to_encoded_point(false);
    let public_key = URL_SAFE_NO_PAD.encode(public_point.as_bytes());

    VapidKeyPair {
        public_key,
        private_key,
    }
}

/// Decode base64url, tolerating trailing `=` padding
fn decode_base64url(value: &str) -> Result<Vec<u8>, String> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| format!("not valid base64url: {}", e))
}
