pub mod memory;
pub mod redis;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::oauth::Credential;

pub use memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("Session serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid session signing key")]
    InvalidKey,
}

/// Everything the server remembers about one browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub credential: Option<Credential>,
    /// Pending OAuth `state` nonce between `/login` and `/callback`.
    #[serde(default)]
    pub oauth_state: Option<String>,
}

/// Process-external key/value store holding [`SessionData`] by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError>;
    async fn save(&self, id: &str, data: &SessionData) -> Result<(), SessionError>;
    async fn remove(&self, id: &str) -> Result<(), SessionError>;
}

pub fn new_session_id() -> String {
    nanoid::nanoid!(32)
}

pub fn new_state_nonce() -> String {
    nanoid::nanoid!(24)
}

/// Signs session ids so a cookie cannot name a session it was not issued for.
///
/// Cookie values have the form `{id}.{hex(HMAC-SHA256(secret, id))}`.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl CookieSigner {
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SessionError::InvalidKey)?;
        Ok(Self { mac })
    }

    pub fn sign(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        format!("{}.{}", id, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the session id if the signature matches.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (id, signature) = value.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id.to_string())
    }
}
