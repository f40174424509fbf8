//! Navigable locations.

use std::fmt;

/// A place the user can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Landing screen; forwards authenticated users to the book list.
    #[default]
    Home,
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// The book list. Guarded.
    Books,
}

impl Route {
    /// The path this route answers to.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Books => "/books",
        }
    }

    /// Human-readable title for headers and menus.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Books => "Books",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
