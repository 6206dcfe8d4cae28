use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Review,
    Published,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Draft => write!(f, "draft"),
            DocumentStatus::Review => write!(f, "review"),
            DocumentStatus::Published => write!(f, "published"),
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(DocumentStatus::Draft),
            "review" => Ok(DocumentStatus::Review),
            "published" => Ok(DocumentStatus::Published),
            _ => Err(format!(
                "Invalid document status '{}'. Valid options: draft, review, published",
                s
            )),
        }
    }
}

/// A file stored in the intranet document library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub size: i64,
    pub status: DocumentStatus,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: i64,
        created_by_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            content_type: content_type.into(),
            size,
            status: DocumentStatus::Draft,
            created_by_id: created_by_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a document; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub status: Option<DocumentStatus>,
}

impl DocumentPatch {
    pub fn apply(&self, document: &mut Document) {
        if let Some(name) = &self.name {
            document.name = name.clone();
        }
        if let Some(status) = self.status {
            document.status = status;
        }
        document.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_draft() {
        let doc = Document::new("Q3 Plan.pdf", "application/pdf", 2048, "u1");
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_patch_updates_only_given_fields() {
        let mut doc = Document::new("Q3 Plan.pdf", "application/pdf", 2048, "u1");
        let created = doc.created_at;

        DocumentPatch {
            name: None,
            status: Some(DocumentStatus::Published),
        }
        .apply(&mut doc);

        assert_eq!(doc.name, "Q3 Plan.pdf");
        assert_eq!(doc.status, DocumentStatus::Published);
        assert!(doc.updated_at >= created);
    }
}
