//! Documents, announcements, the activity log and dashboard stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, CurrentUser};
use crate::dashboard::DashboardStats;
use crate::feed::{self, DEFAULT_FEED_LIMIT};
use crate::models::{
    Activity, ActivityKind, Announcement, AnnouncementCategory, Document, DocumentPatch,
    DocumentStatus, NewNotification, NotificationKind, User,
};

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub(super) struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateDocument {
    name: String,
    content_type: String,
    size: i64,
    #[serde(default)]
    status: DocumentStatus,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateAnnouncement {
    title: String,
    content: String,
    #[serde(default)]
    category: AnnouncementCategory,
}

/// Only the author or an admin may remove content.
fn require_owner_or_admin(current: &CurrentUser, owner_id: &str) -> ApiResult<()> {
    if current.user.id == owner_id || current.user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the author or an admin can do that".to_string(),
        ))
    }
}

async fn record(state: &AppState, activity: Activity) {
    if let Err(e) = state.db.activities().create(&activity).await {
        tracing::warn!("Failed to record {} activity: {}", activity.kind, e);
    }
}

// ============================================================================
// Documents
// ============================================================================

pub(super) async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.db.documents().list().await?))
}

pub(super) async fn recent_documents(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let documents = state.db.documents().list().await?;
    Ok(Json(feed::recent(&documents, query.or(DEFAULT_FEED_LIMIT))))
}

pub(super) async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .db
        .documents()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Document"))
}

pub(super) async fn create_document(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateDocument>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Document name is required".to_string()));
    }
    if payload.size < 0 {
        return Err(ApiError::BadRequest("Document size cannot be negative".to_string()));
    }

    let mut document = Document::new(payload.name, payload.content_type, payload.size, &current.user.id);
    document.status = payload.status;
    state.db.documents().create(&document).await?;

    let author = &current.user.full_name;
    record(
        &state,
        Activity::new(
            ActivityKind::DocumentCreated,
            format!("{} created document \"{}\"", author, document.name),
            &current.user.id,
        )
        .for_document(&document.id),
    )
    .await;
    state
        .notify_others(
            &current.user.id,
            NewNotification::new(
                NotificationKind::Info,
                "New document",
                format!("{} uploaded \"{}\"", author, document.name),
            )
            .with_link(format!("/documents/{}", document.id)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(document)))
}

pub(super) async fn update_document(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<DocumentPatch>,
) -> ApiResult<Json<Document>> {
    let repo = state.db.documents();
    let mut document = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Document"))?;
    let previous_name = document.name.clone();

    if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
        return Err(ApiError::BadRequest("Document name is required".to_string()));
    }
    patch.apply(&mut document);
    if !repo.update(&document).await? {
        return Err(ApiError::NotFound("Document"));
    }

    let author = &current.user.full_name;
    record(
        &state,
        Activity::new(
            ActivityKind::DocumentModified,
            format!("{} modified document \"{}\"", author, previous_name),
            &current.user.id,
        )
        .for_document(&document.id),
    )
    .await;

    let kind = if patch.status == Some(DocumentStatus::Published) {
        NotificationKind::Success
    } else {
        NotificationKind::Info
    };
    state
        .notify_others(
            &current.user.id,
            NewNotification::new(
                kind,
                "Document updated",
                format!("{} modified \"{}\"", author, document.name),
            )
            .with_link(format!("/documents/{}", document.id)),
        )
        .await;

    Ok(Json(document))
}

pub(super) async fn delete_document(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let repo = state.db.documents();
    let document = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Document"))?;
    require_owner_or_admin(&current, &document.created_by_id)?;

    repo.delete(&id).await?;
    tracing::info!(document = %document.name, by = %current.user.username, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Announcements
// ============================================================================

pub(super) async fn list_announcements(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Announcement>>> {
    Ok(Json(state.db.announcements().list().await?))
}

pub(super) async fn recent_announcements(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Announcement>>> {
    let announcements = state.db.announcements().list().await?;
    Ok(Json(feed::recent(&announcements, query.or(DEFAULT_FEED_LIMIT))))
}

pub(super) async fn create_announcement(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateAnnouncement>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Announcement title is required".to_string()));
    }

    let announcement = Announcement::new(
        payload.title,
        payload.content,
        payload.category,
        &current.user.id,
    );
    state.db.announcements().create(&announcement).await?;

    record(
        &state,
        Activity::new(
            ActivityKind::AnnouncementCreated,
            format!(
                "{} created announcement \"{}\"",
                current.user.full_name, announcement.title
            ),
            &current.user.id,
        ),
    )
    .await;

    let kind = match announcement.category {
        AnnouncementCategory::Important => NotificationKind::Warning,
        AnnouncementCategory::Company | AnnouncementCategory::Hr => NotificationKind::Info,
    };
    state
        .notify_others(
            &current.user.id,
            NewNotification::new(kind, announcement.title.clone(), announcement.content.clone())
                .with_link("/announcements"),
        )
        .await;

    Ok((StatusCode::CREATED, Json(announcement)))
}

pub(super) async fn delete_announcement(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let repo = state.db.announcements();
    let announcement = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Announcement"))?;
    require_owner_or_admin(&current, &announcement.created_by_id)?;

    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Activity & dashboard
// ============================================================================

pub(super) async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Activity>>> {
    let activities = state.db.activities().list().await?;
    Ok(Json(feed::recent(&activities, query.or(DEFAULT_ACTIVITY_LIMIT))))
}

pub(super) async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let documents = state.db.documents().list().await?;
    let users: Vec<_> = state
        .db
        .users()
        .list_active()
        .await?
        .iter()
        .map(User::to_public)
        .collect();
    let announcements = state.db.announcements().list().await?;
    let activities = state.db.activities().list().await?;

    Ok(Json(DashboardStats::compute(
        &documents,
        &users,
        &announcements,
        &activities,
        Utc::now(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::notifications::NotificationSnapshot;
    use crate::server::test_support::TestServer;
    use axum::http::Method;
    use serde_json::json;
    use tempfile::tempdir;

    fn new_document(name: &str) -> serde_json::Value {
        json!({"name": name, "contentType": "application/pdf", "size": 1024})
    }

    #[tokio::test]
    async fn test_create_document_records_activity_and_notifies_others() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (alice, alice_token) = server.user("alice", Role::Employee).await;
        let (bob, bob_token) = server.user("bob", Role::Employee).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/documents",
                Some(&alice_token),
                Some(new_document("Handbook.pdf")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "draft");
        assert_eq!(body["createdById"], alice.id.as_str());

        let activities: Vec<Activity> = server.get("/api/activities", &bob_token).await;
        assert_eq!(activities[0].kind, ActivityKind::DocumentCreated);
        assert_eq!(
            activities[0].description,
            "alice Example created document \"Handbook.pdf\""
        );

        let bob_inbox = server.state.hub.snapshot(&bob.id).await;
        assert_eq!(bob_inbox.unread_count, 1);
        assert_eq!(bob_inbox.notifications[0].title, "New document");

        let alice_inbox: NotificationSnapshot = server.get("/api/notifications", &alice_token).await;
        assert_eq!(alice_inbox.unread_count, 0);
    }

    #[tokio::test]
    async fn test_update_document_uses_previous_name() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("alice", Role::Employee).await;

        let (_, created) = server
            .send(Method::POST, "/api/documents", Some(&token), Some(new_document("old.txt")))
            .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = server
            .send(
                Method::PATCH,
                &format!("/api/documents/{}", id),
                Some(&token),
                Some(json!({"name": "new.txt", "status": "published"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "new.txt");
        assert_eq!(body["status"], "published");

        let activities: Vec<Activity> = server.get("/api/activities?limit=1", &token).await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::DocumentModified);
        assert!(activities[0].description.ends_with("modified document \"old.txt\""));
        assert_eq!(activities[0].document_id.as_deref(), Some(id));
    }

    #[tokio::test]
    async fn test_recent_documents_limit_and_order() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("alice", Role::Employee).await;

        for i in 0..7 {
            let mut doc = Document::new(format!("doc-{}", i), "text/plain", 1, "u1");
            doc.updated_at = Utc::now() + chrono::Duration::seconds(i);
            server.state.db.documents().create(&doc).await.unwrap();
        }

        let recent: Vec<Document> = server.get("/api/documents/recent", &token).await;
        let names: Vec<&str> = recent.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["doc-6", "doc-5", "doc-4", "doc-3", "doc-2"]);

        let two: Vec<Document> = server.get("/api/documents/recent?limit=2", &token).await;
        assert_eq!(two.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_document_requires_owner_or_admin() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, alice_token) = server.user("alice", Role::Employee).await;
        let (_, bob_token) = server.user("bob", Role::Employee).await;
        let (_, admin_token) = server.user("root", Role::Admin).await;

        let (_, created) = server
            .send(Method::POST, "/api/documents", Some(&alice_token), Some(new_document("a.pdf")))
            .await;
        let uri = format!("/api/documents/{}", created["id"].as_str().unwrap());

        let (status, _) = server.send(Method::DELETE, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = server.send(Method::DELETE, &uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = server.send(Method::GET, &uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Document not found");
    }

    #[tokio::test]
    async fn test_announcement_flow() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, alice_token) = server.user("alice", Role::Management).await;
        let (bob, bob_token) = server.user("bob", Role::Employee).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/announcements",
                Some(&alice_token),
                Some(json!({"title": "Office closed", "content": "Friday", "category": "important"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        let recent: Vec<Announcement> = server.get("/api/announcements/recent", &bob_token).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].category, AnnouncementCategory::Important);

        let inbox = server.state.hub.snapshot(&bob.id).await;
        assert_eq!(inbox.notifications[0].kind, NotificationKind::Warning);
        assert_eq!(inbox.notifications[0].title, "Office closed");

        let (status, _) = server
            .send(
                Method::DELETE,
                &format!("/api/announcements/{}", id),
                Some(&alice_token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let all: Vec<Announcement> = server.get("/api/announcements", &bob_token).await;
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("alice", Role::Employee).await;
        server.user("bob", Role::Employee).await;

        server
            .send(Method::POST, "/api/documents", Some(&token), Some(new_document("a.pdf")))
            .await;

        let stats: DashboardStats = server.get("/api/dashboard/stats", &token).await;
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_announcements, 0);
        // Both users have a join activity from today
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.documents_trend, 100);
        assert_eq!(stats.announcements_trend, 0);
    }
}
