//! Signed-in state, held explicitly and persisted to `session.ron`.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scout_core::SessionUser;
use scout_logging::{scout_info, scout_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::AuthGrant;

pub const SESSION_FILENAME: &str = "session.ron";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not save session: {0}")]
    Persist(#[from] PersistError),
    #[error("could not remove session file {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    user: Option<SessionUser>,
    #[serde(default)]
    cookie: Option<String>,
    /// SHA-256 of the last résumé uploaded successfully.
    #[serde(default)]
    resume_fingerprint: Option<String>,
}

/// Where the session file lives.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    fn load(&self) -> PersistedSession {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return PersistedSession::default();
            }
            Err(err) => {
                scout_warn!("Failed to read session from {:?}: {}", path, err);
                return PersistedSession::default();
            }
        };
        match ron::from_str(&content) {
            Ok(session) => session,
            Err(err) => {
                scout_warn!("Failed to parse session from {:?}: {}", path, err);
                PersistedSession::default()
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        AtomicFileWriter::new(self.dir.clone()).write_ron(SESSION_FILENAME, session)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Remove { path, source }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthGrant),
    SignedOut,
    ResumeUploaded { fingerprint: String },
}

#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    state: PersistedSession,
}

impl Session {
    /// Read the persisted session. A missing or unreadable file means signed out.
    pub fn init(store: SessionStore) -> Self {
        let state = store.load();
        if let Some(user) = &state.user {
            scout_info!("Restored session for {}", user.uid);
        }
        Self { store, state }
    }

    pub fn update(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::SignedIn(grant) => {
                scout_info!("Signed in as {}", grant.user.uid);
                self.state.user = Some(grant.user);
                self.state.cookie = grant.cookie;
            }
            SessionEvent::SignedOut => {
                self.state = PersistedSession::default();
            }
            SessionEvent::ResumeUploaded { fingerprint } => {
                self.state.resume_fingerprint = Some(fingerprint);
            }
        }
        self.store.save(&self.state)
    }

    /// Forget everything, on disk included.
    pub fn teardown(&mut self) -> Result<(), SessionError> {
        self.state = PersistedSession::default();
        self.store.remove()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.state.user.as_ref()
    }

    pub fn cookie(&self) -> Option<&str> {
        self.state.cookie.as_deref()
    }

    pub fn resume_fingerprint(&self) -> Option<&str> {
        self.state.resume_fingerprint.as_deref()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
