use sqlx::AnyPool;

use super::{parse_enum, parse_timestamp};
use crate::models::Announcement;

pub struct AnnouncementRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    category: String,
    created_by_id: String,
    created_at: String,
}

impl TryFrom<AnnouncementRow> for Announcement {
    type Error = sqlx::Error;

    fn try_from(row: AnnouncementRow) -> Result<Self, Self::Error> {
        Ok(Announcement {
            category: parse_enum(&row.category)?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            title: row.title,
            content: row.content,
            created_by_id: row.created_by_id,
        })
    }
}

impl AnnouncementRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, announcement: &Announcement) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO announcements (id, title, content, category, created_by_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.category.to_string())
        .bind(&announcement.created_by_id)
        .bind(announcement.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Announcement>, sqlx::Error> {
        let row: Option<AnnouncementRow> = sqlx::query_as(
            "SELECT id, title, content, category, created_by_id, created_at FROM announcements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Announcement::try_from).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        let rows: Vec<AnnouncementRow> = sqlx::query_as(
            "SELECT id, title, content, category, created_by_id, created_at FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Announcement::try_from).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
