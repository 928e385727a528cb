use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::models::{CareerMatch, Skill};

/// One row of `skill_analyses`. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillAnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub career_path: String,
    pub coursework_content: String,
    pub skills: Json<Vec<Skill>>,
    pub career_match: Json<CareerMatch>,
    pub created_at: DateTime<Utc>,
}
