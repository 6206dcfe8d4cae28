//! REST server for the intranet dashboard.
//!
//! # Endpoints
//!
//! Public:
//! - `GET /health`
//! - `POST /api/register`, `POST /api/login`
//!
//! Everything else under `/api` needs `Authorization: Bearer <token>`, where
//! the token comes from a login response.

mod account;
mod content;
mod employees;
mod error;
mod finance;
mod notifications;
mod tokens;

pub use account::{LoginRequest, LoginResponse};
pub use employees::EmployeeUpdate;
pub use error::{ApiError, ApiResult, ErrorBody};
pub use tokens::TokenStore;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{Accounts, PasswordHasher};
use crate::db::Database;
use crate::models::{NewNotification, PublicUser};
use crate::notifications::NotificationHub;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub accounts: Arc<Accounts>,
    pub tokens: Arc<TokenStore>,
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    pub fn new(db: Database, hasher: PasswordHasher, session_ttl_hours: u64) -> Self {
        Self {
            accounts: Arc::new(Accounts::new(&db, hasher)),
            tokens: Arc::new(TokenStore::new(session_ttl_hours)),
            hub: Arc::new(NotificationHub::new()),
            db,
        }
    }

    /// Pushes `notification` to every active user except `actor`.
    pub(crate) async fn notify_others(&self, actor: &str, notification: NewNotification) {
        match self.db.users().list_active().await {
            Ok(users) => {
                self.hub
                    .broadcast(users.iter().map(|u| u.id.as_str()), actor, notification)
                    .await;
            }
            Err(e) => tracing::warn!("Skipping notification fan-out: {}", e),
        }
    }
}

/// The logged-in caller, added to request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: PublicUser,
    pub token: String,
}

impl CurrentUser {
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.user.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::admin_only())
        }
    }
}

/// Authentication middleware
///
/// Looks the user up on every request so that role changes and
/// deactivations apply to tokens already handed out.
async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token.trim().to_string(),
            None => return ApiError::invalid_auth().into_response(),
        },
        None => return ApiError::missing_auth().into_response(),
    };

    let Some(user_id) = state.tokens.validate(&token) else {
        return ApiError::invalid_token().into_response();
    };

    match state.db.users().get_by_id(&user_id).await {
        Ok(Some(user)) if user.is_active() => {
            request.extensions_mut().insert(CurrentUser {
                user: user.to_public(),
                token,
            });
            next.run(request).await
        }
        Ok(_) => {
            state.tokens.revoke(&token);
            ApiError::invalid_token().into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.db.backend().to_string(),
    })
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/register", post(account::register))
        .route("/api/login", post(account::login));

    let protected_routes = Router::new()
        .route("/api/logout", post(account::logout))
        .route("/api/user", get(account::current_user))
        .route("/api/employees", get(employees::list))
        .route(
            "/api/employees/{id}",
            get(employees::get_one)
                .patch(employees::update)
                .delete(employees::deactivate),
        )
        .route(
            "/api/documents",
            get(content::list_documents).post(content::create_document),
        )
        .route("/api/documents/recent", get(content::recent_documents))
        .route(
            "/api/documents/{id}",
            get(content::get_document)
                .patch(content::update_document)
                .delete(content::delete_document),
        )
        .route(
            "/api/announcements",
            get(content::list_announcements).post(content::create_announcement),
        )
        .route(
            "/api/announcements/recent",
            get(content::recent_announcements),
        )
        .route(
            "/api/announcements/{id}",
            delete(content::delete_announcement),
        )
        .route("/api/activities", get(content::list_activities))
        .route("/api/dashboard/stats", get(content::dashboard_stats))
        .route(
            "/api/invoices",
            get(finance::list_invoices).post(finance::create_invoice),
        )
        .route(
            "/api/invoices/{id}",
            get(finance::get_invoice)
                .patch(finance::update_invoice)
                .delete(finance::delete_invoice),
        )
        .route(
            "/api/expenses",
            get(finance::list_expenses).post(finance::create_expense),
        )
        .route(
            "/api/expenses/{id}",
            get(finance::get_expense)
                .patch(finance::update_expense)
                .delete(finance::delete_expense),
        )
        .route(
            "/api/revenue",
            get(finance::list_revenue).post(finance::create_revenue),
        )
        .route(
            "/api/revenue/{id}",
            get(finance::get_revenue)
                .patch(finance::update_revenue)
                .delete(finance::delete_revenue),
        )
        .route(
            "/api/budgets",
            get(finance::list_budgets).post(finance::create_budget),
        )
        .route(
            "/api/budgets/{id}",
            get(finance::get_budget)
                .patch(finance::update_budget)
                .delete(finance::delete_budget),
        )
        .route("/api/financials/summary", get(finance::summary))
        .route(
            "/api/notifications",
            get(notifications::list).delete(notifications::clear_all),
        )
        .route("/api/notifications/read-all", post(notifications::read_all))
        .route("/api/notifications/{id}", delete(notifications::clear))
        .route("/api/notifications/{id}/read", post(notifications::read))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}


#[cfg(test)]
mod tests {
    use super::test_support::TestServer;
    use crate::models::Role;
    use axum::http::{Method, StatusCode};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_health_is_public() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;

        let (status, body) = server.send(Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "sqlite");
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;

        let (status, body) = server.send(Method::GET, "/api/user", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_auth");

        let (status, body) = server
            .send(Method::GET, "/api/user", Some("not-a-token"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");
    }

    #[tokio::test]
    async fn test_deactivated_user_token_stops_working() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (alice, token) = server.user("alice", Role::Employee).await;

        let (status, _) = server.send(Method::GET, "/api/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        server
            .state
            .db
            .users()
            .deactivate(&alice.id, chrono::Utc::now())
            .await
            .unwrap();

        let (status, _) = server.send(Method::GET, "/api/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(server.state.tokens.is_empty());
    }
}
