use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementCategory {
    #[default]
    Company,
    Important,
    Hr,
}

impl fmt::Display for AnnouncementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnouncementCategory::Company => write!(f, "company"),
            AnnouncementCategory::Important => write!(f, "important"),
            AnnouncementCategory::Hr => write!(f, "hr"),
        }
    }
}

impl FromStr for AnnouncementCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "company" => Ok(AnnouncementCategory::Company),
            "important" => Ok(AnnouncementCategory::Important),
            "hr" => Ok(AnnouncementCategory::Hr),
            _ => Err(format!(
                "Invalid announcement category '{}'. Valid options: company, important, hr",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: AnnouncementCategory,
        created_by_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            category,
            created_by_id: created_by_id.into(),
            created_at: Utc::now(),
        }
    }
}
