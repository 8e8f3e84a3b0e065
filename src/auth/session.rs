//! Session storage
//!
//! [`TokenStore`] is the single owner of the session. It sits on top of a
//! [`SessionRepository`], which plays the role of the tab's session storage:
//! a flat key/value area that can be swapped for an in-memory fake in tests.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::models::{Role, Session, SessionField};
use crate::error::{Error, Result};

/// Key/value backing store for one tab's session
pub trait SessionRepository: Send + Sync {
    /// Read every stored entry
    fn snapshot(&self) -> Result<BTreeMap<String, String>>;

    /// Replace all entries at once; readers never observe a mix of old and new
    fn replace_all(&self, entries: BTreeMap<String, String>) -> Result<()>;

    /// Remove every entry. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;

    /// Read-modify-write as one step. Nothing is written if `apply` fails.
    fn update(
        &self,
        apply: &mut dyn FnMut(&mut BTreeMap<String, String>) -> Result<()>,
    ) -> Result<()>;
}

/// In-memory repository
#[derive(Default)]
pub struct MemorySessionRepository {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw entries, bypassing session validation
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl SessionRepository for MemorySessionRepository {
    fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.entries.read().clone())
    }

    fn replace_all(&self, entries: BTreeMap<String, String>) -> Result<()> {
        *self.entries.write() = entries;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }

    fn update(
        &self,
        apply: &mut dyn FnMut(&mut BTreeMap<String, String>) -> Result<()>,
    ) -> Result<()> {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        apply(&mut next)?;
        *entries = next;
        Ok(())
    }
}

/// JSON file repository, used by the CLI to keep a login between runs
pub struct FileSessionRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionRepository for FileSessionRepository {
    fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn replace_all(&self, entries: BTreeMap<String, String>) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn update(
        &self,
        apply: &mut dyn FnMut(&mut BTreeMap<String, String>) -> Result<()>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.snapshot()?;
        apply(&mut entries)?;
        self.write_entries(&entries)
    }
}

impl FileSessionRepository {
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a concurrent reader sees either the old or the new file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Single source of truth for session existence and contents
#[derive(Clone)]
pub struct TokenStore {
    repo: Arc<dyn SessionRepository>,
}

impl TokenStore {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    /// Store backed by a fresh in-memory repository
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionRepository::new()))
    }

    /// Overwrite the whole session
    pub fn set(&self, session: &Session) -> Result<()> {
        self.repo.replace_all(session.to_entries())?;
        debug!(role = %session.role, "Session stored");
        Ok(())
    }

    /// Read one field; unreadable storage counts as absent
    pub fn get(&self, field: SessionField) -> Option<String> {
        self.entries().remove(field.key())
    }

    /// The full session, if every required field is present
    pub fn session(&self) -> Option<Session> {
        Session::from_entries(&self.entries())
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(SessionField::AccessToken)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(SessionField::RefreshToken)
    }

    /// Stored role; None if missing or not a known role
    pub fn role(&self) -> Option<Role> {
        self.get(SessionField::Role).and_then(|r| r.parse().ok())
    }

    pub fn student_id(&self) -> Option<String> {
        self.get(SessionField::StudentId).filter(|id| !id.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Install a refreshed access token (and a rotated refresh token, if
    /// any) and reset the token timestamp.
    ///
    /// `used_refresh` is the refresh token the new access token was obtained
    /// with. If the store no longer holds it (logout, a new login, or a
    /// rotation by a concurrent refresh) nothing is written and
    /// [`Error::NotAuthenticated`] is returned. Racing refreshes with the
    /// same refresh token all succeed; the last write wins.
    pub fn update_access_token(
        &self,
        used_refresh: &str,
        access: &str,
        rotated: Option<&str>,
    ) -> Result<()> {
        self.repo.update(&mut |entries: &mut BTreeMap<String, String>| {
            if entries.get(SessionField::RefreshToken.key()).map(String::as_str) != Some(used_refresh) {
                return Err(Error::NotAuthenticated);
            }
            entries.insert(SessionField::AccessToken.key().to_string(), access.to_string());
            if let Some(refresh) = rotated {
                entries.insert(SessionField::RefreshToken.key().to_string(), refresh.to_string());
            }
            entries.insert(
                SessionField::TokenTimestamp.key().to_string(),
                Utc::now().to_rfc3339(),
            );
            Ok(())
        })
    }

    /// Remove every session field
    pub fn clear(&self) -> Result<()> {
        self.repo.clear()?;
        debug!("Session cleared");
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, String> {
        self.repo.snapshot().unwrap_or_else(|e| {
            warn!("Failed to read session storage: {}", e);
            BTreeMap::new()
        })
    }
}
