//! HTTP client for the intradash server.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::{AuthError, Authenticated, Authenticator};
use crate::dashboard::DashboardStats;
use crate::directory::DirectoryFilter;
use crate::models::{Activity, Announcement, Document, NewUser, PublicUser};
use crate::notifications::NotificationSnapshot;
use crate::server::{ErrorBody, LoginRequest, LoginResponse};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

#[derive(Deserialize)]
struct MarkedRead {
    updated: usize,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, AuthError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body: Option<ErrorBody> = response.json().await.ok();
        Err(error_from_response(status, body))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AuthError> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("unexpected response: {}", e)))
    }

    /// Revokes the current token on the server.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.send(self.request(Method::POST, "/api/logout")).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<PublicUser, AuthError> {
        self.json(self.request(Method::GET, "/api/user")).await
    }

    pub async fn employees(&self, filter: &DirectoryFilter) -> Result<Vec<PublicUser>, AuthError> {
        let mut params = Vec::new();
        if let Some(search) = &filter.search {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(department) = filter.department {
            params.push(format!("department={}", urlencoding::encode(department.label())));
        }
        let path = if params.is_empty() {
            "/api/employees".to_string()
        } else {
            format!("/api/employees?{}", params.join("&"))
        };
        self.json(self.request(Method::GET, &path)).await
    }

    pub async fn recent_documents(&self, limit: usize) -> Result<Vec<Document>, AuthError> {
        let path = format!("/api/documents/recent?limit={}", limit);
        self.json(self.request(Method::GET, &path)).await
    }

    pub async fn recent_announcements(&self, limit: usize) -> Result<Vec<Announcement>, AuthError> {
        let path = format!("/api/announcements/recent?limit={}", limit);
        self.json(self.request(Method::GET, &path)).await
    }

    pub async fn activities(&self, limit: usize) -> Result<Vec<Activity>, AuthError> {
        let path = format!("/api/activities?limit={}", limit);
        self.json(self.request(Method::GET, &path)).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AuthError> {
        self.json(self.request(Method::GET, "/api/dashboard/stats"))
            .await
    }

    pub async fn notifications(&self) -> Result<NotificationSnapshot, AuthError> {
        self.json(self.request(Method::GET, "/api/notifications"))
            .await
    }

    pub async fn mark_read(&self, id: u64) -> Result<NotificationSnapshot, AuthError> {
        let path = format!("/api/notifications/{}/read", id);
        self.json(self.request(Method::POST, &path)).await
    }

    pub async fn mark_all_read(&self) -> Result<usize, AuthError> {
        let marked: MarkedRead = self
            .json(self.request(Method::POST, "/api/notifications/read-all"))
            .await?;
        Ok(marked.updated)
    }

    pub async fn clear_notification(&self, id: u64) -> Result<(), AuthError> {
        let path = format!("/api/notifications/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    pub async fn clear_notifications(&self) -> Result<(), AuthError> {
        self.send(self.request(Method::DELETE, "/api/notifications"))
            .await?;
        Ok(())
    }
}

impl Authenticator for ApiClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated, AuthError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .json(self.request(Method::POST, "/api/login").json(&body))
            .await?;

        Ok(Authenticated {
            user: response.user,
            token: Some(response.token),
        })
    }

    async fn register(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        self.json(self.request(Method::POST, "/api/register").json(&new_user))
            .await
    }
}

/// Maps an error response back onto the auth error taxonomy.
fn error_from_response(status: StatusCode, body: Option<ErrorBody>) -> AuthError {
    let (code, message) = match body {
        Some(body) => (body.error, body.message),
        None => (String::new(), status.to_string()),
    };

    match status {
        StatusCode::UNAUTHORIZED if code == "invalid_credentials" => AuthError::InvalidCredentials,
        StatusCode::UNAUTHORIZED => AuthError::Denied(format!("{} (try logging in again)", message)),
        StatusCode::FORBIDDEN => AuthError::Denied(message),
        // Only registration answers with a conflict
        StatusCode::CONFLICT => {
            let quoted = message.split('\'').nth(1).map(str::to_string);
            AuthError::DuplicateUsername(quoted.unwrap_or(message))
        }
        StatusCode::BAD_REQUEST => AuthError::Validation(message),
        StatusCode::NOT_FOUND => AuthError::NotFound,
        _ => AuthError::Transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, SessionStore};
    use crate::models::{Department, NotificationKind, NewNotification};
    use crate::server::{router, AppState};
    use crate::auth::fast_hasher;
    use crate::db::test_db;
    use tempfile::tempdir;

    fn body(error: &str, message: &str) -> Option<ErrorBody> {
        Some(ErrorBody {
            error: error.to_string(),
            message: message.to_string(),
        })
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            error_from_response(StatusCode::UNAUTHORIZED, body("invalid_credentials", "x")),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            error_from_response(StatusCode::UNAUTHORIZED, body("invalid_token", "expired")),
            AuthError::Denied(_)
        ));
        assert!(matches!(
            error_from_response(StatusCode::CONFLICT, body("conflict", "Username 'alice' already exists")),
            AuthError::DuplicateUsername(name) if name == "alice"
        ));
        assert!(matches!(
            error_from_response(StatusCode::BAD_REQUEST, body("validation_error", "short")),
            AuthError::Validation(m) if m == "short"
        ));
        assert!(matches!(
            error_from_response(StatusCode::BAD_GATEWAY, None),
            AuthError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.authenticate("alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    async fn spawn_server(dir: &std::path::Path) -> (String, AppState) {
        let state = AppState::new(test_db(dir).await, fast_hasher(), 24);
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    #[tokio::test]
    async fn test_session_store_over_http() {
        let temp_dir = tempdir().unwrap();
        let (url, state) = spawn_server(temp_dir.path()).await;

        let mut session = SessionStore::bootstrap(ApiClient::new(&url), MemoryStorage::new());
        let registered = session
            .register(NewUser {
                username: "alice".to_string(),
                password: "s3cret!".to_string(),
                full_name: "Alice Liddell".to_string(),
                email: "alice@example.com".to_string(),
                department: Department::Marketing,
                title: "Lead".to_string(),
                role: None,
            })
            .await
            .unwrap();
        assert!(!session.is_authenticated());

        session.login("alice", "s3cret!").await.unwrap();
        let token = session.token().map(str::to_string);
        assert!(token.is_some());

        let client = ApiClient::new(&url).with_token(token);
        let me = client.current_user().await.unwrap();
        assert_eq!(me.id, registered.id);

        state
            .hub
            .notify(&me.id, NewNotification::new(NotificationKind::Success, "Welcome", "hi"))
            .await;
        let inbox = client.notifications().await.unwrap();
        assert_eq!(inbox.unread_count, 1);
        assert_eq!(client.mark_all_read().await.unwrap(), 1);

        let activity = client.activities(10).await.unwrap();
        assert_eq!(activity.len(), 1);

        let found = client
            .employees(&DirectoryFilter {
                search: Some("ali".to_string()),
                department: Some(Department::Marketing),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        client.logout().await.unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, AuthError::Denied(_)));
    }
}
