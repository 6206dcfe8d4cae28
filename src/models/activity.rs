use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What happened in an activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    DocumentCreated,
    DocumentModified,
    AnnouncementCreated,
    UserJoined,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::DocumentCreated => write!(f, "document_created"),
            ActivityKind::DocumentModified => write!(f, "document_modified"),
            ActivityKind::AnnouncementCreated => write!(f, "announcement_created"),
            ActivityKind::UserJoined => write!(f, "user_joined"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document_created" => Ok(ActivityKind::DocumentCreated),
            "document_modified" => Ok(ActivityKind::DocumentModified),
            "announcement_created" => Ok(ActivityKind::AnnouncementCreated),
            "user_joined" => Ok(ActivityKind::UserJoined),
            _ => Err(format!("Invalid activity type '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, description: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            description: description.into(),
            user_id: user_id.into(),
            document_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}
