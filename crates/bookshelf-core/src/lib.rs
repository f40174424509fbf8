//! Core types and utilities for the bookshelf client.
//!
//! This crate provides the foundational types used throughout the client:
//!
//! - **Identifiers**: Strongly-typed, server-assigned IDs for books, tags, and users
//! - **Model**: `Book`, `Tag`, and `User` as returned by the catalog API
//! - **Drafts**: Validated form payloads (`BookDraft`, `Credentials`)
//! - **Selections**: Tag-name sets and the pure book filter built on them
//!
//! # Example
//!
//! ```
//! use bookshelf_core::{filter_books, Book, BookId, Tag, TagId, TagSelection};
//!
//! let books = vec![Book {
//!     id: BookId::new(1),
//!     title: "Dune".into(),
//!     author: "Frank Herbert".into(),
//!     rating: 5,
//!     comment: None,
//!     owner_id: None,
//!     tags: vec![Tag::new(TagId::new(1), "sci-fi")],
//! }];
//!
//! let mut selection = TagSelection::new();
//! selection.toggle("history");
//! assert!(filter_books(&books, &selection).is_empty());
//!
//! selection.toggle("sci-fi");
//! assert_eq!(filter_books(&books, &selection).len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod draft;
pub mod error;
pub mod filter;
pub mod ids;
pub mod model;
pub mod selection;

pub use draft::{BookDraft, Credentials, Rating};
pub use error::ValidationError;
pub use filter::filter_books;
pub use ids::{BookId, TagId, UserId};
pub use model::{Book, Tag, User};
pub use selection::TagSelection;
