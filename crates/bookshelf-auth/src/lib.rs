//! Session storage for the bookshelf client.
//!
//! This crate owns the single bearer token a client holds at any time:
//!
//! - `SessionStore` trait with file-backed and in-memory implementations
//! - `SessionContext`, the handle injected into every component that makes
//!   authenticated calls
//! - Session file location resolution
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Controllers    │────▶│  SessionContext  │
//! │ (guard, books,   │     │  (cheap clone)   │
//! │  login, ...)     │     └────────┬─────────┘
//! └──────────────────┘              │
//!                          ┌────────▼─────────┐
//!                          │   SessionStore   │
//!                          │   (trait)        │
//!                          └────────┬─────────┘
//!                     ┌─────────────┴────────────┐
//!            ┌────────▼─────────┐       ┌────────▼─────────┐
//!            │ FileSessionStore │       │MemorySessionStore│
//!            │ session.json     │       │ (tests)          │
//!            └──────────────────┘       └──────────────────┘
//! ```
//!
//! There is no expiry tracking. A token stays valid until the API rejects it,
//! at which point whoever saw the rejection clears the session.
//!
//! # Example
//!
//! ```
//! use bookshelf_auth::{MemorySessionStore, SessionContext};
//!
//! let session = SessionContext::new(MemorySessionStore::default());
//! assert!(!session.is_authenticated());
//!
//! session.store_token("abc123").unwrap();
//! assert_eq!(session.token().as_deref(), Some("abc123"));
//!
//! session.clear();
//! assert!(session.token().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod error;
pub mod file;
pub mod paths;
pub mod store;

pub use context::SessionContext;
pub use error::{Result, SessionError};
pub use file::FileSessionStore;
pub use paths::{bookshelf_home, session_path};
pub use store::{MemorySessionStore, SessionStore, StoredSession};
