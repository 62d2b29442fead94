//! Mailbox session persistence
//!
//! A session is the account/token pair produced by provisioning. It is the
//! only state that survives a restart; message lists are always re-fetched.
//! Stores are expected to hold at most one session at a time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::models::Account;

/// Filename of the persisted session inside the config directory
pub const SESSION_FILE: &str = "session.json";

/// A provisioned mailbox: the registered account and its bearer token.
///
/// The token is never refreshed; when the provider rejects it the whole
/// session is discarded and a new mailbox is provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

impl Session {
    pub fn new(account: Account, token: impl Into<String>) -> Self {
        Self {
            account,
            token: token.into(),
        }
    }
}

/// Persistence for the current session
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any
    fn load(&self) -> Result<Option<Session>>;

    /// Replace the stored session
    fn save(&self, session: &Session) -> Result<()>;

    /// Discard the stored session; clearing an empty store is fine
    fn clear(&self) -> Result<()>;
}

/// Session store backed by a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the session at the default location (~/.config/mistbox/session.json)
    pub fn in_config_dir() -> Result<Self> {
        let path = config::config_path(SESSION_FILE)
            .context("Could not determine config directory")?;
        Ok(Self::new(path))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

/// Session store holding the session in memory only
pub struct InMemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.read().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.write().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.write().unwrap() = None;
        Ok(())
    }
}
