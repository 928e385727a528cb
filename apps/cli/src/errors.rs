use thiserror::Error;

/// Everything a command can fail with. Messages are shown to the user verbatim.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with `{ "error": ... }`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Not signed in. Run `skillsync sign-in` first.")]
    NotSignedIn,

    #[error("{0}")]
    OAuth(String),

    #[error("Missing information: {0}")]
    MissingInformation(String),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::Api { status: 429, .. })
    }
}
