//! File-backed session store.
//!
//! The session is a small JSON document written with owner-only permissions
//! on Unix. The file is read once on open and cached; every write goes
//! straight to disk so another run sees it.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{Result, SessionError};
use crate::store::{SessionStore, StoredSession};

/// A session store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<Option<StoredSession>>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any session already there.
    ///
    /// A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = load(&path)?;
        tracing::debug!(
            path = %path.display(),
            has_session = cached.is_some(),
            "Opened session file"
        );
        Ok(Self {
            path,
            cache: RwLock::new(cached),
        })
    }

    /// The file this store writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SessionError::io(parent, e))?;
            }
        }

        let contents = serde_json::to_string_pretty(session).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| SessionError::io(&self.path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| SessionError::io(&self.path, e))
    }
}

fn load(path: &Path) -> Result<Option<StoredSession>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SessionError::io(path, e)),
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| SessionError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<StoredSession> {
        self.cache.read().clone()
    }

    fn set(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let session = StoredSession::now(token);
        self.write(&session)?;
        *self.cache.write() = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SessionError::io(&self.path, e)),
        }
        cache.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path().join("session.json")).unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn set_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set("abc123").unwrap();
        assert!(path.exists());

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get().unwrap().token, "abc123");
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set("abc123").unwrap();
        store.clear().unwrap();

        assert!(store.get().is_none());
        assert!(!path.exists());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn failed_removal_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set("abc123").unwrap();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(matches!(store.clear(), Err(SessionError::Io { .. })));
        assert_eq!(store.get().unwrap().token, "abc123");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::open(&path).unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::open(&path).unwrap();
        store.set("abc123").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
