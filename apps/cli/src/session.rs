//! Session context: the one place that knows who is signed in.
//!
//! Views receive a `SessionContext` explicitly. Anything that cares about sign-in state
//! subscribes to a single broadcast channel of [`SessionEvent`]s; dropping the returned
//! [`SessionSubscription`] unsubscribes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
#[cfg(test)]
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ClientError;

const EVENT_CAPACITY: usize = 16;
/// Refresh this many seconds before the provider would reject the token.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl SessionUser {
    /// Name if known, else email, else the id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: SessionUser,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    Refreshed(Session),
}

struct Inner {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    pub fn new(initial: Option<Session>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(initial),
                events,
            }),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.inner.events.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    pub fn sign_in(&self, session: Session) {
        self.replace(Some(session.clone()));
        self.emit(SessionEvent::SignedIn(session));
    }

    pub fn refresh(&self, session: Session) {
        self.replace(Some(session.clone()));
        self.emit(SessionEvent::Refreshed(session));
    }

    pub fn sign_out(&self) {
        self.replace(None);
        self.emit(SessionEvent::SignedOut);
    }

    fn replace(&self, session: Option<Session>) {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn emit(&self, event: SessionEvent) {
        // Err only means nobody is listening.
        if self.inner.events.send(event).is_err() {
            debug!("Session event emitted with no subscribers");
        }
    }
}

/// A live subscription to session changes. Released on drop.
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Waits for the next event. `None` once the context is gone.
    #[cfg(test)]
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, skipped {skipped} events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Session persisted between runs as JSON.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/skillsync/session.json`
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|d| Self::new(d.join("skillsync").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An unreadable file is discarded and the user starts signed out.
    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(
                    "Discarding corrupt session file {}: {e}",
                    self.path.display()
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Writes the session readable by the owner only; it carries the refresh token.
    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten files written by older versions too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Mirrors one session change onto disk.
    pub fn apply(&self, event: &SessionEvent) -> Result<(), ClientError> {
        match event {
            SessionEvent::SignedIn(session) | SessionEvent::Refreshed(session) => {
                self.save(session)
            }
            SessionEvent::SignedOut => self.clear(),
        }
    }

    /// Drains everything `subscription` has received so far onto disk.
    pub fn persist_pending(&self, subscription: &mut SessionSubscription) -> Result<(), ClientError> {
        while let Some(event) = subscription.try_recv() {
            self.apply(&event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_session(expires_at: i64) -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at,
        user: SessionUser {
            id: Uuid::nil(),
            email: Some("ada@example.edu".to_string()),
            name: Some("Ada".to_string()),
        },
    }
}
