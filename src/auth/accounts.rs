//! Credential checks and account creation against the user store.

use chrono::Utc;
use std::future::Future;
use uuid::Uuid;

use super::{AuthError, PasswordHasher};
use crate::db::{ActivityRepository, Database, UserRepository};
use crate::models::{Activity, ActivityKind, NewUser, PublicUser, Role, User};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    pub user: PublicUser,
    /// Bearer token issued by a remote server, if any.
    pub token: Option<String>,
}

/// Something that can check credentials and create accounts.
///
/// Implemented locally by [`Accounts`] and remotely by the HTTP client, so
/// the session store works the same against either.
pub trait Authenticator {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Authenticated, AuthError>> + Send;

    fn register(
        &self,
        new_user: NewUser,
    ) -> impl Future<Output = Result<PublicUser, AuthError>> + Send;
}

/// Account service backed by the database.
pub struct Accounts {
    users: UserRepository,
    activities: ActivityRepository,
    hasher: PasswordHasher,
}

impl Accounts {
    pub fn new(db: &Database, hasher: PasswordHasher) -> Self {
        Self {
            users: db.users(),
            activities: db.activities(),
            hasher,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Checks a username and password.
    ///
    /// Unknown users, deactivated users and wrong passwords are all reported
    /// as [`AuthError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> Result<PublicUser, AuthError> {
        let Some(user) = self.users.get_by_username(username).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active() {
            tracing::debug!(username, "Login for deactivated user");
            return Err(AuthError::InvalidCredentials);
        }

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(username, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(username, "User logged in");
        Ok(user.to_public())
    }

    /// Creates an account and records a `user_joined` activity.
    pub async fn create_account(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        new_user.validate().map_err(AuthError::Validation)?;

        if self.users.username_exists(&new_user.username).await? {
            return Err(AuthError::DuplicateUsername(new_user.username));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            password_hash: self.hasher.hash(&new_user.password)?,
            username: new_user.username,
            full_name: new_user.full_name,
            email: new_user.email,
            department: new_user.department,
            title: new_user.title,
            role: new_user.role.unwrap_or(Role::Employee),
            created_at: Utc::now(),
            deactivated_at: None,
        };

        // Two concurrent registrations can both pass the existence check;
        // the unique index decides.
        if let Err(e) = self.users.create(&user).await {
            return Err(match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AuthError::DuplicateUsername(user.username)
                }
                other => other.into(),
            });
        }

        let joined = Activity::new(
            ActivityKind::UserJoined,
            format!("{} joined the team", user.full_name),
            &user.id,
        );
        if let Err(e) = self.activities.create(&joined).await {
            tracing::warn!("Failed to record join activity for {}: {}", user.username, e);
        }

        tracing::info!(username = %user.username, role = %user.role, "Account created");
        Ok(user.to_public())
    }
}

impl Authenticator for Accounts {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated, AuthError> {
        let user = self.login(username, password).await?;
        Ok(Authenticated { user, token: None })
    }

    async fn register(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        self.create_account(new_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::fast_hasher;
    use crate::db::test_db;
    use crate::models::Department;
    use tempfile::tempdir;

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            full_name: "Alice Liddell".to_string(),
            email: format!("{}@example.com", username),
            department: Department::Engineering,
            title: "Engineer".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        let created = accounts
            .create_account(new_user("alice", "s3cret!"))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Employee);

        let user = accounts.login("alice", "s3cret!").await.unwrap();
        assert_eq!(user.id, created.id);

        let stored = db.users().get_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "s3cret!");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_records_join_activity() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        let user = accounts
            .create_account(new_user("alice", "s3cret!"))
            .await
            .unwrap();

        let activities = db.activities().list().await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::UserJoined);
        assert_eq!(activities[0].user_id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        accounts
            .create_account(new_user("alice", "s3cret!"))
            .await
            .unwrap();
        let err = accounts
            .create_account(new_user("alice", "another1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateUsername(name) if name == "alice"));
        assert_eq!(db.users().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        let err = accounts
            .create_account(new_user("al", "s3cret!"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert!(db.users().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        let alice = accounts
            .create_account(new_user("alice", "s3cret!"))
            .await
            .unwrap();

        let wrong_password = accounts.login("alice", "nope").await.unwrap_err();
        let unknown_user = accounts.login("mallory", "s3cret!").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        db.users().deactivate(&alice.id, Utc::now()).await.unwrap();
        let deactivated = accounts.login("alice", "s3cret!").await.unwrap_err();
        assert!(matches!(deactivated, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_requested_role_is_kept() {
        let temp_dir = tempdir().unwrap();
        let db = test_db(temp_dir.path()).await;
        let accounts = Accounts::new(&db, fast_hasher());

        let mut payload = new_user("boss", "s3cret!");
        payload.role = Some(Role::Management);
        let user = accounts.create_account(payload).await.unwrap();

        assert_eq!(user.role, Role::Management);
    }
}
