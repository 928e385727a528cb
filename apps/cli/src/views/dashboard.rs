//! Collects coursework and a career path, then runs and stores an analysis.

use std::fs;
use std::path::Path;

use skillsync_api::analysis::models::CareerPath;

use crate::api::ApiClient;
use crate::auth_provider::AuthProvider;
use crate::errors::ClientError;
use crate::session::SessionContext;
use crate::views::{active_session, profile::render_profile};

/// Coursework comes from `file` when given, else from `text`. Only `.txt` files are read.
pub fn read_coursework(text: Option<String>, file: Option<&Path>) -> Result<String, ClientError> {
    let Some(path) = file else {
        return Ok(text.unwrap_or_default());
    };
    let is_txt = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Err(ClientError::MissingInformation(format!(
            "{} is not a .txt file. For best results, use .txt files or paste your content directly.",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}

/// Checks the form before anything touches the network.
pub fn validate(coursework: &str, career: Option<&str>) -> Result<CareerPath, ClientError> {
    let career = career.map(str::trim).filter(|c| !c.is_empty());
    let (false, Some(career)) = (coursework.trim().is_empty(), career) else {
        return Err(ClientError::MissingInformation(
            "Please provide coursework content and select a career path.".to_string(),
        ));
    };
    career.parse().map_err(|_| {
        ClientError::MissingInformation(format!(
            "Unknown career path '{career}'. Run `skillsync careers` to see the options."
        ))
    })
}

pub async fn analyze(
    ctx: &SessionContext,
    provider: &AuthProvider,
    api: &ApiClient,
    coursework: String,
    career: Option<&str>,
) -> Result<String, ClientError> {
    let career_path = validate(&coursework, career)?;
    let session = active_session(ctx, provider).await?;

    tracing::info!("Analyzing coursework for career path: {career_path}");
    let profile = api
        .create_analysis(&session, &coursework, career_path)
        .await?;

    let share_url = api.share_url(profile.id);
    Ok(format!(
        "Analysis complete! Your skill portfolio has been generated.\n\n{}",
        render_profile(&profile, Some(&session.user), &share_url)
    ))
}

pub fn careers() -> String {
    CareerPath::ALL
        .iter()
        .map(CareerPath::label)
        .collect::<Vec<_>>()
        .join("\n")
}
