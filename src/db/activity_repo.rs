use sqlx::AnyPool;

use super::{parse_enum, parse_timestamp};
use crate::models::Activity;

pub struct ActivityRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: String,
    kind: String,
    description: String,
    user_id: String,
    document_id: Option<String>,
    created_at: String,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = sqlx::Error;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Activity {
            kind: parse_enum(&row.kind)?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            description: row.description,
            user_id: row.user_id,
            document_id: row.document_id,
        })
    }
}

impl ActivityRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, activity: &Activity) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO activities (id, kind, description, user_id, document_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&activity.id)
        .bind(activity.kind.to_string())
        .bind(&activity.description)
        .bind(&activity.user_id)
        .bind(activity.document_id.as_deref())
        .bind(activity.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The whole activity log; ordering is left to the feed projector.
    pub async fn list(&self) -> Result<Vec<Activity>, sqlx::Error> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT id, kind, description, user_id, document_id, created_at FROM activities",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Activity::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::ActivityKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_activity_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.activities();

        let joined = Activity::new(ActivityKind::UserJoined, "Alice joined", "u1");
        let created = Activity::new(ActivityKind::DocumentCreated, "Alice created a doc", "u1")
            .for_document("d1");
        repo.create(&joined).await.unwrap();
        repo.create(&created).await.unwrap();

        let mut all = repo.list().await.unwrap();
        all.sort_by(|a, b| a.description.cmp(&b.description));

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, ActivityKind::DocumentCreated);
        assert_eq!(all[0].document_id.as_deref(), Some("d1"));
        assert_eq!(all[1].kind, ActivityKind::UserJoined);
        assert_eq!(all[1].document_id, None);
    }
}
