//! The session handle passed to every component that needs a token.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::store::SessionStore;

/// Shared access to the client's single bearer token.
///
/// Cloning is cheap; all clones see the same store.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    /// Wrap a store.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap an already shared store.
    #[must_use]
    pub fn from_arc(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get().map(|s| s.token)
    }

    /// Whether a token is present. Says nothing about whether the server
    /// still accepts it.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_some()
    }

    /// Persist a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or cannot persist the token.
    pub fn store_token(&self, token: &str) -> Result<()> {
        self.store.set(token)?;
        tracing::info!("Session token stored");
        Ok(())
    }

    /// Drop the token after the server rejected it.
    ///
    /// Failing to remove persisted state is logged, not returned.
    pub fn clear(&self) {
        match self.store.clear() {
            Ok(()) => tracing::info!("Session cleared"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear session"),
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;

    #[test]
    fn clones_share_state() {
        let a = SessionContext::new(MemorySessionStore::default());
        let b = a.clone();

        a.store_token("abc123").unwrap();
        assert_eq!(b.token().as_deref(), Some("abc123"));

        b.clear();
        assert!(!a.is_authenticated());
    }

    #[test]
    fn debug_hides_token() {
        let session = SessionContext::new(MemorySessionStore::with_token("secret-token"));
        let shown = format!("{session:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("authenticated: true"));
    }
}
