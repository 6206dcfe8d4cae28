//! Bearer tokens for logged-in API clients.
//!
//! Tokens live in memory and expire after the configured session lifetime.
//! Only a SHA-256 digest of each token is kept, so a memory dump does not
//! hand out usable credentials.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Data associated with a token.
#[derive(Debug, Clone)]
pub struct TokenData {
    /// User the token was issued to.
    pub user_id: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// In-memory token store with expiry.
#[derive(Debug)]
pub struct TokenStore {
    /// Token data indexed by token digest.
    tokens: RwLock<HashMap<String, TokenData>>,
    lifetime: Duration,
}

impl TokenStore {
    /// Creates a token store whose tokens last `lifetime_hours`.
    pub fn new(lifetime_hours: u64) -> Self {
        Self::with_lifetime(Duration::from_secs(lifetime_hours * 60 * 60))
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            lifetime,
        }
    }

    /// Issues a new token for `user_id`.
    ///
    /// Returns the token string (32 bytes, base64url encoded).
    pub fn issue(&self, user_id: &str) -> String {
        let token = generate_token();
        let now = Instant::now();

        self.write().insert(
            digest(&token),
            TokenData {
                user_id: user_id.to_string(),
                created_at: now,
                expires_at: now + self.lifetime,
            },
        );

        token
    }

    /// Returns the user a live token belongs to.
    ///
    /// Expired tokens are dropped on sight.
    pub fn validate(&self, token: &str) -> Option<String> {
        let key = digest(token);

        {
            let tokens = self.read();
            match tokens.get(&key) {
                None => return None,
                Some(data) if Instant::now() < data.expires_at => {
                    return Some(data.user_id.clone());
                }
                Some(_) => {}
            }
        }

        self.write().remove(&key);
        None
    }

    /// Revokes one token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.write().remove(&digest(token)).is_some()
    }

    /// Revokes every token held by `user_id`, returning how many were removed.
    pub fn revoke_user(&self, user_id: &str) -> usize {
        let mut tokens = self.write();
        let before = tokens.len();
        tokens.retain(|_, data| data.user_id != user_id);
        before - tokens.len()
    }

    /// Removes all expired tokens.
    ///
    /// Returns the number of tokens removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut tokens = self.write();
        let now = Instant::now();

        let before = tokens.len();
        tokens.retain(|_, data| data.expires_at > now);
        before - tokens.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock only means another request panicked mid-update; the
    // map itself is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, TokenData>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, TokenData>> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn digest(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
