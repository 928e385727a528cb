//! Client for the managed auth provider's REST API (`/auth/v1/*`).
//!
//! Only Google OAuth through the provider's hosted authorize endpoint is supported.

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::errors::ClientError;
use crate::session::{Session, SessionUser};

const OAUTH_PROVIDER: &str = "google";
/// Used when the callback omits `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Tokens carried in the fragment of the OAuth callback URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
    full_name: Option<String>,
}

impl From<ProviderUser> for SessionUser {
    fn from(user: ProviderUser) -> Self {
        SessionUser {
            id: user.id,
            email: user.email,
            name: user.user_metadata.name.or(user.user_metadata.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: ProviderUser,
}

pub struct AuthProvider {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthProvider {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            anon_key,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// The URL to open in a browser to start Google sign-in.
    pub fn authorize_url(&self, redirect_to: &str) -> Result<Url, ClientError> {
        Url::parse_with_params(
            &self.endpoint("authorize"),
            &[("provider", OAUTH_PROVIDER), ("redirect_to", redirect_to)],
        )
        .map_err(|e| ClientError::OAuth(format!("Invalid auth provider URL: {e}")))
    }

    /// Completes sign-in from the URL the browser landed on.
    pub async fn session_from_callback(&self, callback_url: &str) -> Result<Session, ClientError> {
        let tokens = parse_callback(callback_url)?;
        let user = self.get_user(&tokens.access_token).await?;
        Ok(Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: Utc::now().timestamp() + tokens.expires_in,
            user,
        })
    }

    pub async fn get_user(&self, access_token: &str) -> Result<SessionUser, ClientError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let user: ProviderUser = check(response).await?.json().await?;
        Ok(user.into())
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ClientError> {
        debug!("Refreshing session");
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;
        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now().timestamp() + token.expires_in,
            user: token.user.into(),
        })
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Auth provider returned {status}: {body}");
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Reads tokens (or an OAuth error) out of a callback URL.
///
/// The provider puts tokens in the fragment; errors may come in the query or the fragment.
pub fn parse_callback(callback_url: &str) -> Result<CallbackTokens, ClientError> {
    let url = Url::parse(callback_url.trim())
        .map_err(|e| ClientError::OAuth(format!("Invalid callback URL: {e}")))?;

    let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if let Some(fragment) = url.fragment() {
        let mut fragment_url = url.clone();
        fragment_url.set_query(Some(fragment));
        params.extend(fragment_url.query_pairs().into_owned());
    }
    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    };

    if let Some(error) = get("error") {
        let detail = get("error_description").unwrap_or(error);
        return Err(ClientError::OAuth(format!(
            "Authentication failed: {detail}. Please try again."
        )));
    }

    let access_token = get("access_token")
        .ok_or_else(|| ClientError::OAuth("Callback URL carries no access token".to_string()))?;
    let refresh_token = get("refresh_token")
        .ok_or_else(|| ClientError::OAuth("Callback URL carries no refresh token".to_string()))?;
    let expires_in = get("expires_in")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

    Ok(CallbackTokens {
        access_token,
        refresh_token,
        expires_in,
    })
}
