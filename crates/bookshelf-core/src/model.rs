//! Catalog records as returned by the API.

use serde::{Deserialize, Serialize};

use crate::ids::{BookId, TagId, UserId};

/// A user-defined label attachable to many books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Server-assigned identifier.
    pub id: TagId,
    /// Tag name, unique per user.
    pub name: String,
}

impl Tag {
    /// Create a tag record.
    #[must_use]
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A book in the user's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Server-assigned identifier.
    pub id: BookId,
    /// Title, never empty.
    pub title: String,
    /// Author, never empty.
    pub author: String,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Owner of the record, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    /// Tags referenced by this book.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Book {
    /// Iterate over the names of this book's tags.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    /// The comment, or an empty string when there is none.
    #[must_use]
    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_deserializes_server_shape() {
        let json = r#"{
            "id": 3,
            "title": "SPQR",
            "author": "Mary Beard",
            "rating": 4,
            "comment": null,
            "owner_id": 1,
            "tags": [{"id": 1, "name": "history", "owner_id": 1}]
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, BookId::new(3));
        assert_eq!(book.comment_text(), "");
        assert_eq!(book.owner_id, Some(UserId::new(1)));
        assert_eq!(book.tag_names().collect::<Vec<_>>(), vec!["history"]);
    }

    #[test]
    fn book_without_tags_or_comment() {
        let json = r#"{"id": 1, "title": "A", "author": "B", "rating": 2}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.tags.is_empty());
        assert!(book.comment.is_none());
    }
}
