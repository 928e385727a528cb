//! Terminal views. Each takes the session context explicitly; none hold session state.

pub mod auth;
pub mod dashboard;
pub mod profile;

use chrono::Utc;

use crate::auth_provider::AuthProvider;
use crate::errors::ClientError;
use crate::session::{Session, SessionContext};

/// The signed-in session, refreshed first if it is about to expire.
pub async fn active_session(
    ctx: &SessionContext,
    provider: &AuthProvider,
) -> Result<Session, ClientError> {
    let session = ctx.current().ok_or(ClientError::NotSignedIn)?;
    if !session.is_expired(Utc::now().timestamp()) {
        return Ok(session);
    }

    match provider.refresh(&session.refresh_token).await {
        Ok(refreshed) => {
            ctx.refresh(refreshed.clone());
            Ok(refreshed)
        }
        Err(e) => {
            tracing::warn!("Session refresh failed: {e}");
            ctx.sign_out();
            Err(ClientError::NotSignedIn)
        }
    }
}
