use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use skillsync_api::analysis::handlers::ProfileResponse;
use skillsync_api::analysis::models::CareerPath;

use crate::errors::ClientError;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the SkillSync API.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn share_url(&self, id: Uuid) -> String {
        format!("{}/api/v1/profiles/{id}", self.base_url)
    }

    /// Runs an analysis and stores it for the session's user.
    pub async fn create_analysis(
        &self,
        session: &Session,
        coursework_content: &str,
        career_path: CareerPath,
    ) -> Result<ProfileResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/v1/analyses", self.base_url))
            .bearer_auth(&session.access_token)
            .json(&json!({
                "courseworkContent": coursework_content,
                "careerPath": career_path,
            }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Latest analysis of the session's user; `None` when there is none yet.
    pub async fn profile(&self, session: &Session) -> Result<Option<ProfileResponse>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/v1/profile", self.base_url))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        optional(response).await
    }

    pub async fn shared_profile(&self, id: Uuid) -> Result<Option<ProfileResponse>, ClientError> {
        let response = self.client.get(self.share_url(id)).send().await?;
        optional(response).await
    }
}

async fn optional(response: Response) -> Result<Option<ProfileResponse>, ClientError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    Ok(Some(check(response).await?.json().await?))
}

/// Turns a non-success response into `ClientError::Api` carrying the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
