//! The session store trait and its in-memory implementation.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// The persisted form of a session.
///
/// `saved_at` is informational; it is never used to expire the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Bearer token returned by the login endpoint.
    pub token: String,
    /// When the token was stored.
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    /// Stamp a token with the current time.
    #[must_use]
    pub fn now(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Storage for at most one bearer token.
///
/// This trait abstracts where the token lives, allowing for an in-memory
/// implementation in tests.
pub trait SessionStore: Send + Sync {
    /// Return the last stored session, if any.
    fn get(&self) -> Option<StoredSession>;

    /// Replace the stored session with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or cannot be persisted.
    fn set(&self, token: &str) -> Result<()>;

    /// Remove the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// A session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<StoredSession>>,
}

impl MemorySessionStore {
    /// Create a store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(StoredSession::now(token))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<StoredSession> {
        self.inner.read().clone()
    }

    fn set(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        *self.inner.write() = Some(StoredSession::now(token));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner.write().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::default();
        assert!(store.get().is_none());

        store.set("abc123").unwrap();
        assert_eq!(store.get().unwrap().token, "abc123");

        store.set("def456").unwrap();
        assert_eq!(store.get().unwrap().token, "def456");

        store.clear().unwrap();
        assert!(store.get().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn memory_store_rejects_empty_token() {
        let store = MemorySessionStore::with_token("keep");
        assert!(matches!(store.set(""), Err(SessionError::EmptyToken)));
        assert_eq!(store.get().unwrap().token, "keep");
    }
}
