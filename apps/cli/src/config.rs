use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Base URL of the auth provider project, e.g. `https://xyz.supabase.co`.
    pub auth_url: String,
    pub anon_key: String,
    pub api_url: String,
    /// Where the provider sends the browser after Google sign-in.
    pub redirect_url: String,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(CliConfig {
            auth_url: trim_slash(require_env("SUPABASE_URL")?),
            anon_key: require_env("SUPABASE_ANON_KEY")?,
            api_url: trim_slash(
                std::env::var("SKILLSYNC_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            ),
            redirect_url: std::env::var("SKILLSYNC_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
        })
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
