//! The client-side login session.
//!
//! ```text
//! Anonymous --login()--> [authenticating] --ok--> Authenticated
//!     ^                        |                       |
//!     +------- error ----------+                       |
//!     +---------------------- logout() ----------------+
//! ```
//!
//! The authenticating state is the lifetime of the `login` future; nothing is
//! written until the authenticator answers.

use serde::{Deserialize, Serialize};

use super::{AuthError, Authenticated, Authenticator, ClientStorage, ClientStorageError};
use crate::models::{NewUser, PublicUser};

/// Storage key the session is persisted under.
pub const CURRENT_USER_KEY: &str = "current_user";

/// What gets persisted for a logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: PublicUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

pub struct SessionStore<A, S> {
    authenticator: A,
    storage: S,
    state: SessionState,
}

impl<A: Authenticator, S: ClientStorage> SessionStore<A, S> {
    /// Restores any persisted session.
    ///
    /// Never fails: unreadable storage starts anonymous, and an entry that
    /// does not parse is purged.
    pub fn bootstrap(authenticator: A, mut storage: S) -> Self {
        let state = match storage.get(CURRENT_USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    tracing::debug!(username = %session.user.username, "Restored session");
                    SessionState::Authenticated(session)
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable session: {}", e);
                    purge(&mut storage);
                    SessionState::Anonymous
                }
            },
            Ok(None) => SessionState::Anonymous,
            Err(e @ ClientStorageError::Corrupt(..)) => {
                tracing::warn!("{}", e);
                purge(&mut storage);
                SessionState::Anonymous
            }
            Err(e) => {
                tracing::warn!("Could not read persisted session: {}", e);
                SessionState::Anonymous
            }
        };

        Self {
            authenticator,
            storage,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        match &self.state {
            SessionState::Authenticated(session) => Some(&session.user),
            SessionState::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(session) => session.token.as_deref(),
            SessionState::Anonymous => None,
        }
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Logs in and persists the session.
    ///
    /// On failure, including a failure to persist, the previous state is left
    /// untouched. Taking `&mut self`
    /// means a second login cannot start while one is pending.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<PublicUser, AuthError> {
        let Authenticated { user, token } =
            self.authenticator.authenticate(username, password).await?;

        let session = Session {
            user: user.clone(),
            token,
        };

        let json = serde_json::to_string(&session)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize session: {}", e)))?;
        self.storage
            .set(CURRENT_USER_KEY, &json)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        self.state = SessionState::Authenticated(session);
        tracing::info!(username = %user.username, "Logged in");
        Ok(user)
    }

    /// Creates an account without logging in as it.
    pub async fn register(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        let user = self.authenticator.register(new_user).await?;
        tracing::info!(username = %user.username, "Registered");
        Ok(user)
    }

    /// Forgets the session. Safe to call when already anonymous.
    ///
    /// The in-memory state always becomes anonymous. An error means the
    /// persisted entry could not be removed and would be restored on the
    /// next bootstrap.
    pub fn logout(&mut self) -> Result<(), ClientStorageError> {
        if let SessionState::Authenticated(session) = std::mem::take(&mut self.state) {
            tracing::info!(username = %session.user.username, "Logged out");
        }
        self.storage.remove(CURRENT_USER_KEY)
    }
}

fn purge<S: ClientStorage>(storage: &mut S) {
    if let Err(e) = storage.remove(CURRENT_USER_KEY) {
        tracing::warn!("Failed to clear persisted session: {}", e);
    }
}
