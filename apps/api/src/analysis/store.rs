//! Persistence for analysis results in the `skill_analyses` table.
//!
//! Append-only: rows are inserted once and never updated or deleted.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::{AnalysisResult, CareerPath};
use crate::models::analysis::SkillAnalysisRow;

/// Everything one insert needs.
pub struct NewAnalysis<'a> {
    pub user_id: Uuid,
    pub career_path: CareerPath,
    pub coursework_content: &'a str,
    pub result: &'a AnalysisResult,
}

/// Carried in `AppState` as `Arc<dyn AnalysisStore>`.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, new: NewAnalysis<'_>) -> Result<SkillAnalysisRow, sqlx::Error>;

    /// Most recent analysis for a user, if any.
    async fn latest_for_user(&self, user_id: Uuid)
        -> Result<Option<SkillAnalysisRow>, sqlx::Error>;

    async fn get(&self, id: Uuid) -> Result<Option<SkillAnalysisRow>, sqlx::Error>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, new: NewAnalysis<'_>) -> Result<SkillAnalysisRow, sqlx::Error> {
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, SkillAnalysisRow>(
            r#"
            INSERT INTO skill_analyses
                (id, user_id, career_path, coursework_content, skills, career_match)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new.user_id)
        .bind(new.career_path.label())
        .bind(new.coursework_content)
        .bind(Json(&new.result.skills))
        .bind(Json(&new.result.career_match))
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted skill analysis {id} for user {}", new.user_id);
        Ok(row)
    }

    async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SkillAnalysisRow>, sqlx::Error> {
        sqlx::query_as::<_, SkillAnalysisRow>(
            "SELECT * FROM skill_analyses WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<SkillAnalysisRow>, sqlx::Error> {
        sqlx::query_as::<_, SkillAnalysisRow>("SELECT * FROM skill_analyses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
