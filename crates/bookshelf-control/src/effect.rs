//! What a controller asks the shell to do after handling a completion.

use std::fmt;

use crate::route::Route;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The operation worked.
    Success,
    /// The operation failed.
    Error,
}

/// A blocking message the user must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Headline, e.g. "Book added successfully!".
    pub message: String,
    /// Extra context, usually the server's explanation of a failure.
    pub detail: Option<String>,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            detail: None,
        }
    }

    /// A failure notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns `true` for failure notices.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A side effect requested by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a blocking notice.
    Notify(Notice),
    /// Unmount the current view and mount another.
    Navigate(Route),
    /// Show the login form even though a token is stored.
    ///
    /// Used when the stored token could not be verified; the login view's
    /// usual redirect for signed-in users is skipped.
    SignIn,
}

impl Effect {
    /// Shorthand for a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::Notify(Notice::success(message))
    }

    /// Shorthand for a failure notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Notify(Notice::error(message))
    }
}
