//! Renders a stored analysis as a plain-text skill portfolio.

use uuid::Uuid;

use skillsync_api::analysis::handlers::ProfileResponse;

use crate::api::ApiClient;
use crate::auth_provider::AuthProvider;
use crate::errors::ClientError;
use crate::session::{SessionContext, SessionUser};
use crate::views::active_session;

const BAR_WIDTH: usize = 20;

pub const NO_ANALYSIS: &str =
    "No analysis found. Please complete a coursework analysis first (`skillsync analyze`).";

fn fit_bar(percentage: u8) -> String {
    let filled = (usize::from(percentage.min(100)) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn render_profile(
    profile: &ProfileResponse,
    user: Option<&SessionUser>,
    share_url: &str,
) -> String {
    let mut out = Vec::new();
    let career_match = &profile.career_match;

    if let Some(user) = user {
        out.push(format!("{}'s Skill Portfolio", user.display_name()));
        out.push(String::new());
    }

    out.push(format!("Career Path Match: {}", career_match.career));
    out.push(format!(
        "{} {}%",
        fit_bar(career_match.percentage_fit),
        career_match.percentage_fit
    ));
    out.push(format!(
        "Matched skills: {}",
        career_match.matched_skills.join(", ")
    ));
    if let Some(missing) = career_match.missing_skills.as_ref().filter(|m| !m.is_empty()) {
        out.push(format!("Skills to develop: {}", missing.join(", ")));
    }
    if let Some(recommendations) = &career_match.recommendations {
        out.push(format!("Recommendations: {recommendations}"));
    }

    out.push(String::new());
    out.push(format!("Skills ({})", profile.skills.len()));
    for skill in &profile.skills {
        out.push(format!(
            "  * {} [{}] {}%",
            skill.name,
            skill.category,
            (skill.confidence * 100.0).round() as i64
        ));
        if !skill.related_courses.is_empty() {
            out.push(format!(
                "    Related courses: {}",
                skill.related_courses.join(", ")
            ));
        }
    }

    out.push(String::new());
    out.push(format!("Share this portfolio: {share_url}"));
    out.join("\n")
}

/// Own latest profile, or a shared one when `id` is given (no sign-in needed).
pub async fn show(
    ctx: &SessionContext,
    provider: &AuthProvider,
    api: &ApiClient,
    id: Option<Uuid>,
) -> Result<String, ClientError> {
    let (profile, session) = match id {
        Some(id) => (api.shared_profile(id).await?, None),
        None => {
            let session = active_session(ctx, provider).await?;
            (api.profile(&session).await?, Some(session))
        }
    };

    let Some(profile) = profile else {
        return Ok(NO_ANALYSIS.to_string());
    };
    let share_url = api.share_url(profile.id);
    Ok(render_profile(
        &profile,
        session.as_ref().map(|s| &s.user),
        &share_url,
    ))
}
