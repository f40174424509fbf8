//! View controllers for the bookshelf client.
//!
//! Everything between the terminal and the network lives here: the route
//! guard, the book list, the login and registration forms, and the router
//! that mounts them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  keys   ┌──────────────────────────────┐
//! │   TUI    │────────▶│ Router                       │
//! │ (cli)    │◀────────│  ├─ Screen (one mounted view)│
//! └──────────┘ notices │  │    └─ ViewScope (tasks)   │
//!                      │  └─ AppContext               │
//!                      │       ├─ ApiGateway          │
//!                      │       └─ SessionContext      │
//!                      └──────────────────────────────┘
//! ```
//!
//! Controllers never await the network themselves. A request is spawned
//! into the mounted view's [`ViewScope`] and its result comes back later as
//! a [`Completion`], which the controller folds into its state and answers
//! with [`Effect`]s (notices and navigation). Navigating away drops the
//! scope, which aborts anything still in flight, so a late response can
//! never touch a view that is gone.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod books;
pub mod context;
pub mod effect;
pub mod field;
pub mod guard;
pub mod route;
pub mod router;
pub mod scope;

pub use auth::{CredentialField, CredentialsForm, HomeView, LoginController, RegisterController};
pub use books::{BookForm, BookListController, FormField, FormMode};
pub use context::AppContext;
pub use effect::{Effect, Notice, NoticeLevel};
pub use field::TextField;
pub use guard::{GuardState, RouteGuard};
pub use route::Route;
pub use router::{BooksScreen, Router, Screen};
pub use scope::{Completion, ViewScope};
