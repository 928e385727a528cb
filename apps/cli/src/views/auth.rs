//! Sign-in, sign-out and whoami.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::auth_provider::AuthProvider;
use crate::errors::ClientError;
use crate::session::SessionContext;

/// Prints the authorize URL, then completes sign-in from the callback URL.
/// When `callback` is `None` the URL is read from stdin.
pub async fn sign_in(
    ctx: &SessionContext,
    provider: &AuthProvider,
    redirect_url: &str,
    callback: Option<String>,
) -> Result<String, ClientError> {
    let callback = match callback {
        Some(url) => url,
        None => {
            let authorize = provider.authorize_url(redirect_url)?;
            println!("Open this URL in your browser to continue with Google:\n\n  {authorize}\n");
            println!("Then paste the URL your browser was redirected to:");
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await?;
            line
        }
    };

    let session = provider.session_from_callback(&callback).await?;
    let name = session.user.display_name();
    ctx.sign_in(session);
    Ok(format!("Signed in as {name}."))
}

/// Signs out locally even when the provider call fails.
pub async fn sign_out(ctx: &SessionContext, provider: &AuthProvider) -> String {
    if let Some(session) = ctx.current() {
        if let Err(e) = provider.sign_out(&session.access_token).await {
            warn!("Provider sign-out failed: {e}");
        }
    }
    ctx.sign_out();
    "Signed out. You've been successfully signed out.".to_string()
}

pub fn whoami(ctx: &SessionContext) -> Result<String, ClientError> {
    let session = ctx.current().ok_or(ClientError::NotSignedIn)?;
    let user = &session.user;
    Ok(match &user.email {
        Some(email) => format!("{} <{email}> ({})", user.display_name(), user.id),
        None => format!("{} ({})", user.display_name(), user.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{test_session, SessionEvent};

    #[test]
    fn test_whoami_requires_session() {
        let ctx = SessionContext::new(None);
        assert!(matches!(whoami(&ctx), Err(ClientError::NotSignedIn)));
    }

    #[test]
    fn test_whoami_shows_name_and_email() {
        let ctx = SessionContext::new(Some(test_session(0)));
        let line = whoami(&ctx).unwrap();
        assert!(line.starts_with("Ada <ada@example.edu>"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_if_provider_unreachable() {
        let ctx = SessionContext::new(Some(test_session(0)));
        let mut sub = ctx.subscribe();
        // Nothing listens on port 9 locally.
        let provider = AuthProvider::new("http://127.0.0.1:9".into(), "anon".into());

        sign_out(&ctx, &provider).await;

        assert_eq!(ctx.current(), None);
        assert_eq!(sub.try_recv(), Some(SessionEvent::SignedOut));
    }

    #[tokio::test]
    async fn test_sign_in_with_error_callback_leaves_session_untouched() {
        let ctx = SessionContext::new(None);
        let provider = AuthProvider::new("http://127.0.0.1:9".into(), "anon".into());

        let err = sign_in(
            &ctx,
            &provider,
            "http://localhost/auth/callback",
            Some("http://localhost/auth/callback?error=access_denied".into()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::OAuth(_)));
        assert_eq!(ctx.current(), None);
    }
}
