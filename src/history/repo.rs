use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Analysis, AnalysisStatus, NewAnalysis};

/// Storage operations on analysis records.
#[async_trait]
pub trait AnalysisRepo: Send + Sync {
    async fn insert(&self, new: NewAnalysis) -> anyhow::Result<Analysis>;
    /// Active records of a user, newest first.
    async fn list_active(&self, user_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Analysis>>;
    async fn count_active(&self, user_id: Uuid) -> anyhow::Result<i64>;
    /// Archive every active record of a user; returns how many moved.
    async fn clear_history(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgAnalysisRepo {
    db: PgPool,
}

impl PgAnalysisRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalysisRepo for PgAnalysisRepo {
    async fn insert(&self, new: NewAnalysis) -> anyhow::Result<Analysis> {
        let rec = new.into_record(OffsetDateTime::now_utc());
        let row = sqlx::query_as::<_, Analysis>(
            r#"
            INSERT INTO analyses
                (id, user_id, record_id, image_urls, analysis_result, suggestions, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, record_id, image_urls, analysis_result, suggestions, status, created_at
            "#,
        )
        .bind(rec.id)
        .bind(rec.user_id)
        .bind(&rec.record_id)
        .bind(&rec.image_urls)
        .bind(&rec.analysis_result)
        .bind(&rec.suggestions)
        .bind(rec.status)
        .bind(rec.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_active(&self, user_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Analysis>> {
        let rows = sqlx::query_as::<_, Analysis>(
            r#"
            SELECT id, user_id, record_id, image_urls, analysis_result, suggestions, status, created_at
            FROM analyses
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(AnalysisStatus::Active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn count_active(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM analyses WHERE user_id = $1 AND status = $2")
                .bind(user_id)
                .bind(AnalysisStatus::Active)
                .fetch_one(&self.db)
                .await?;
        Ok(count)
    }

    async fn clear_history(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("UPDATE analyses SET status = $2 WHERE user_id = $1 AND status = $3")
            .bind(user_id)
            .bind(AnalysisStatus::Cleared)
            .bind(AnalysisStatus::Active)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
