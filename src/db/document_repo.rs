use sqlx::AnyPool;

use super::{parse_enum, parse_timestamp};
use crate::models::Document;

pub struct DocumentRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    name: String,
    content_type: String,
    size: i64,
    status: String,
    created_by_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            status: parse_enum(&row.status)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            name: row.name,
            content_type: row.content_type,
            size: row.size,
            created_by_id: row.created_by_id,
        })
    }
}

const COLUMNS: &str = "id, name, content_type, size, status, created_by_id, created_at, updated_at";

impl DocumentRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, document: &Document) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, name, content_type, size, status, created_by_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&document.id)
        .bind(&document.name)
        .bind(&document.content_type)
        .bind(document.size)
        .bind(document.status.to_string())
        .bind(&document.created_by_id)
        .bind(document.created_at.to_rfc3339())
        .bind(document.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, sqlx::Error> {
        let row: Option<DocumentRow> =
            sqlx::query_as(&format!("SELECT {} FROM documents WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Document::try_from).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Document>, sqlx::Error> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM documents ORDER BY updated_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    pub async fn update(&self, document: &Document) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET name = $1, status = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&document.name)
        .bind(document.status.to_string())
        .bind(document.updated_at.to_rfc3339())
        .bind(&document.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
