//! Coursework analysis: prompt construction and the gateway round trip.

use serde_json::Value;
use tracing::info;

use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::analysis::store::{AnalysisStore, NewAnalysis};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::ChatGateway;
use crate::models::analysis::SkillAnalysisRow;

pub fn system_prompt() -> String {
    format!("{ANALYSIS_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Fills the user prompt. The coursework goes in last so text inside it is never re-substituted.
pub fn user_prompt(request: &AnalysisRequest) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{career_path}", request.career_path.label())
        .replace("{coursework_content}", &request.coursework_content)
}

/// Runs one analysis and returns the gateway's JSON untouched.
pub async fn analyze_coursework(
    gateway: &dyn ChatGateway,
    request: &AnalysisRequest,
) -> Result<Value, AppError> {
    info!(
        "Analyzing coursework for career path: {}",
        request.career_path
    );

    let analysis = gateway
        .complete_json(&system_prompt(), &user_prompt(request))
        .await?;

    info!("Analysis completed successfully");
    Ok(analysis)
}

/// Analyzes, then stores the result for `user_id`. A failed analysis never reaches the store.
pub async fn analyze_and_store(
    gateway: &dyn ChatGateway,
    store: &dyn AnalysisStore,
    user_id: uuid::Uuid,
    request: &AnalysisRequest,
) -> Result<SkillAnalysisRow, AppError> {
    let value = analyze_coursework(gateway, request).await?;
    let result = AnalysisResult::from_value(value)?;

    let row = store
        .insert(NewAnalysis {
            user_id,
            career_path: request.career_path,
            coursework_content: &request.coursework_content,
            result: &result,
        })
        .await?;

    Ok(row)
}
