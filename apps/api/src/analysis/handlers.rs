//! Axum route handlers for the Analysis API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::models::{AnalysisRequest, AnalysisRequestBody, CareerMatch, Skill};
use crate::analysis::service::{analyze_and_store, analyze_coursework};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::analysis::SkillAnalysisRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A stored analysis as shown on a (possibly shared) profile.
/// Leaves out the raw coursework and the owner id.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub career_path: String,
    pub skills: Vec<Skill>,
    pub career_match: CareerMatch,
    pub created_at: DateTime<Utc>,
}

impl From<SkillAnalysisRow> for ProfileResponse {
    fn from(row: SkillAnalysisRow) -> Self {
        Self {
            id: row.id,
            career_path: row.career_path,
            skills: row.skills.0,
            career_match: row.career_match.0,
            created_at: row.created_at,
        }
    }
}

fn parse_request(
    payload: Result<Json<AnalysisRequestBody>, JsonRejection>,
) -> Result<AnalysisRequest, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    AnalysisRequest::try_from(body)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /functions/v1/analyze-coursework
///
/// Relays one analysis and returns the gateway's JSON object as-is.
pub async fn handle_analyze_coursework(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequestBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = parse_request(payload)?;
    let analysis = analyze_coursework(state.gateway.as_ref(), &request).await?;
    Ok(Json(analysis))
}

/// OPTIONS /functions/v1/analyze-coursework
pub async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

/// POST /api/v1/analyses
///
/// Analyze, then persist for the signed-in user. Responds with the stored profile.
pub async fn handle_create_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<AnalysisRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let request = parse_request(payload)?;
    let row = analyze_and_store(
        state.gateway.as_ref(),
        state.store.as_ref(),
        user.id,
        &request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = state
        .store
        .latest_for_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No analysis found".to_string()))?;
    Ok(Json(row.into()))
}

/// GET /api/v1/profiles/:id
///
/// Public read of one analysis; this is the shareable profile link.
pub async fn handle_get_shared_profile(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Path(id) = id.map_err(|e| AppError::Validation(e.body_text()))?;
    let row = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;
    Ok(Json(row.into()))
}
