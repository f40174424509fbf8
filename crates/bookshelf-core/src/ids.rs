//! Core identifier types for the bookshelf client.
//!
//! All identifiers are assigned by the server as positive integers. The
//! newtypes keep book, tag, and user IDs from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! server_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw server-assigned value.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

server_id! {
    /// Identifier of a book in the catalog.
    BookId
}

server_id! {
    /// Identifier of a user-defined tag.
    TagId
}

server_id! {
    /// Identifier of a registered user.
    UserId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_raw_value() {
        let id = BookId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "BookId(42)");
        assert_eq!(TagId::new(3).get(), 3);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back.get(), 7);
    }
}
