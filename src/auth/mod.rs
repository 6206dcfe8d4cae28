//! Authentication: password hashing, account lookup and the client session.

mod accounts;
mod client_storage;
mod password;
mod session;

pub use accounts::{Accounts, Authenticated, Authenticator};
pub use client_storage::{ClientStorage, ClientStorageError, FileStorage, MemoryStorage};
pub use password::PasswordHasher;
pub use session::{Session, SessionState, SessionStore, CURRENT_USER_KEY};

#[cfg(test)]
pub(crate) use password::fast_hasher;

use thiserror::Error;

/// Failures surfaced by login, registration and account management.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    /// Authenticated but not allowed, or the session is no longer valid.
    #[error("{0}")]
    Denied(String),

    #[error("Server unavailable: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            other => AuthError::Storage(other.to_string()),
        }
    }
}
