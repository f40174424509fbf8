//! Session file location.
//!
//! Resolution order:
//! 1. `BOOKSHELF_HOME` environment variable (if set)
//! 2. `~/.config/bookshelf` (default)
//! 3. `./.bookshelf` when no home directory can be determined

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "BOOKSHELF_HOME";

/// File name of the persisted session.
pub const SESSION_FILE: &str = "session.json";

/// Returns the bookshelf data directory.
#[must_use]
pub fn bookshelf_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }

    dirs::home_dir().map_or_else(
        || PathBuf::from(".bookshelf"),
        |h| h.join(".config").join("bookshelf"),
    )
}

/// Returns the default session file path.
#[must_use]
pub fn session_path() -> PathBuf {
    bookshelf_home().join(SESSION_FILE)
}
