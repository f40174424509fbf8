//! HTTP client for the bookshelf catalog API.
//!
//! This crate provides the `ApiGateway` trait, the seam every controller
//! talks through, and `HttpGateway`, its reqwest implementation:
//!
//! | Method | Path          | Auth   | Purpose                   |
//! |--------|---------------|--------|---------------------------|
//! | POST   | `/token`      | none   | login (form-encoded)      |
//! | POST   | `/users/`     | none   | registration              |
//! | GET    | `/user/`      | bearer | identity probe            |
//! | GET    | `/books/`     | bearer | list books                |
//! | POST   | `/books/`     | bearer | create book               |
//! | PUT    | `/books/{id}` | bearer | update book               |
//! | GET    | `/tags/`      | bearer | list tags                 |
//! | POST   | `/tags/`      | bearer | create tag                |
//!
//! A 401 from any endpoint surfaces as `ApiError::Unauthorized`; everything
//! else that goes wrong is a request failure.
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_api::{ApiConfig, ApiGateway, HttpGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new(ApiConfig::new("http://localhost:8000"))?;
//!
//! let token = gateway.login("alice", "secret").await?;
//! for book in gateway.list_books(&token).await? {
//!     println!("{} by {} ({}/5)", book.title, book.author, book.rating);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorKind, Result};
pub use gateway::{ApiGateway, HttpGateway};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockGateway, Operation};
