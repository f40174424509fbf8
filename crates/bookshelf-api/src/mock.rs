//! In-memory gateway for tests.
//!
//! `MockGateway` behaves like a tiny single-tenant catalog server: it knows
//! its users and their tokens, assigns IDs, resolves tag names on book
//! writes, and answers `Unauthorized` to unknown tokens. Failures can be
//! injected per operation, and every call is recorded.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use bookshelf_core::{Book, BookDraft, BookId, Tag, TagId, User, UserId};

use crate::error::{ApiError, Result};
use crate::gateway::ApiGateway;

/// The operations a gateway exposes, for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `login`
    Login,
    /// `register`
    Register,
    /// `who_am_i`
    WhoAmI,
    /// `list_books`
    ListBooks,
    /// `create_book`
    CreateBook,
    /// `update_book`
    UpdateBook,
    /// `list_tags`
    ListTags,
    /// `create_tag`
    CreateTag,
}

#[derive(Debug)]
struct Account {
    user: User,
    password: String,
    token: String,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<Account>,
    books: Vec<Book>,
    tags: Vec<Tag>,
    failures: HashMap<Operation, u16>,
    calls: Vec<Operation>,
}

impl MockState {
    fn user_for(&self, token: &str) -> Result<User> {
        self.accounts
            .iter()
            .find(|a| a.token == token)
            .map(|a| a.user.clone())
            .ok_or(ApiError::Unauthorized)
    }

    fn next_book_id(&self) -> BookId {
        BookId::new(self.books.iter().map(|b| b.id.get()).max().unwrap_or(0) + 1)
    }

    fn next_tag_id(&self) -> TagId {
        TagId::new(self.tags.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1)
    }

    /// Resolve names to tags, creating any that do not exist yet.
    fn resolve_tags(&mut self, names: &[String]) -> Vec<Tag> {
        names
            .iter()
            .map(|name| {
                if let Some(tag) = self.tags.iter().find(|t| &t.name == name) {
                    tag.clone()
                } else {
                    let tag = Tag::new(self.next_tag_id(), name.clone());
                    self.tags.push(tag.clone());
                    tag
                }
            })
            .collect()
    }

    fn book_from(&mut self, id: BookId, owner: UserId, draft: &BookDraft) -> Book {
        Book {
            id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            rating: draft.rating.get(),
            comment: Some(draft.comment.clone()),
            owner_id: Some(owner),
            tags: self.resolve_tags(&draft.tags),
        }
    }
}

/// Scriptable in-memory `ApiGateway`.
#[derive(Debug, Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    /// An empty server with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account whose login yields `token`.
    #[must_use]
    pub fn with_user(self, username: &str, password: &str, token: &str) -> Self {
        {
            let mut state = self.state.lock();
            let id = UserId::new(i64::try_from(state.accounts.len()).unwrap_or(i64::MAX) + 1);
            state.accounts.push(Account {
                user: User {
                    id,
                    username: username.to_string(),
                },
                password: password.to_string(),
                token: token.to_string(),
            });
        }
        self
    }

    /// Seed a book.
    #[must_use]
    pub fn with_book(self, book: Book) -> Self {
        self.state.lock().books.push(book);
        self
    }

    /// Seed a tag.
    #[must_use]
    pub fn with_tag(self, tag: Tag) -> Self {
        self.state.lock().tags.push(tag);
        self
    }

    /// Make every later call to `op` fail with `status` (401 maps to
    /// `Unauthorized`).
    pub fn fail(&self, op: Operation, status: u16) {
        self.state.lock().failures.insert(op, status);
    }

    /// Stop injecting failures for `op`.
    pub fn recover(&self, op: Operation) {
        self.state.lock().failures.remove(&op);
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().calls.clone()
    }

    /// How many times `op` was called.
    #[must_use]
    pub fn call_count(&self, op: Operation) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }

    /// Books as the server currently holds them.
    #[must_use]
    pub fn books(&self) -> Vec<Book> {
        self.state.lock().books.clone()
    }

    /// Tags as the server currently holds them.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.state.lock().tags.clone()
    }

    /// Record the call and apply any injected failure.
    fn enter(&self, op: Operation) -> Result<parking_lot::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock();
        state.calls.push(op);
        match state.failures.get(&op).copied() {
            Some(401) => Err(ApiError::Unauthorized),
            Some(status) => Err(ApiError::Api {
                status,
                message: "injected failure".to_string(),
            }),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl ApiGateway for MockGateway {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let state = self.enter(Operation::Login)?;
        state
            .accounts
            .iter()
            .find(|a| a.user.username == username && a.password == password)
            .map(|a| a.token.clone())
            .ok_or(ApiError::Unauthorized)
    }

    async fn register(&self, username: &str, password: &str) -> Result<User> {
        let mut state = self.enter(Operation::Register)?;
        if state.accounts.iter().any(|a| a.user.username == username) {
            return Err(ApiError::Api {
                status: 400,
                message: "Username already registered".to_string(),
            });
        }
        let id = UserId::new(i64::try_from(state.accounts.len()).unwrap_or(i64::MAX) + 1);
        let user = User {
            id,
            username: username.to_string(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
            token: format!("token-{username}"),
        });
        Ok(user)
    }

    async fn who_am_i(&self, token: &str) -> Result<User> {
        self.enter(Operation::WhoAmI)?.user_for(token)
    }

    async fn list_books(&self, token: &str) -> Result<Vec<Book>> {
        let state = self.enter(Operation::ListBooks)?;
        state.user_for(token)?;
        Ok(state.books.clone())
    }

    async fn create_book(&self, token: &str, draft: &BookDraft) -> Result<Book> {
        let mut state = self.enter(Operation::CreateBook)?;
        let owner = state.user_for(token)?.id;
        let id = state.next_book_id();
        let book = state.book_from(id, owner, draft);
        state.books.push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, token: &str, id: BookId, draft: &BookDraft) -> Result<Book> {
        let mut state = self.enter(Operation::UpdateBook)?;
        let owner = state.user_for(token)?.id;
        let Some(pos) = state.books.iter().position(|b| b.id == id) else {
            return Err(ApiError::Api {
                status: 404,
                message: "Book not found".to_string(),
            });
        };
        let book = state.book_from(id, owner, draft);
        state.books[pos] = book.clone();
        Ok(book)
    }

    async fn list_tags(&self, token: &str) -> Result<Vec<Tag>> {
        let state = self.enter(Operation::ListTags)?;
        state.user_for(token)?;
        Ok(state.tags.clone())
    }

    async fn create_tag(&self, token: &str, name: &str) -> Result<Tag> {
        let mut state = self.enter(Operation::CreateTag)?;
        state.user_for(token)?;
        if state.tags.iter().any(|t| t.name == name) {
            return Err(ApiError::Api {
                status: 400,
                message: "Tag already exists".to_string(),
            });
        }
        let tag = Tag::new(state.next_tag_id(), name);
        state.tags.push(tag.clone());
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::TagSelection;

    fn server() -> MockGateway {
        MockGateway::new()
            .with_user("alice", "secret", "abc123")
            .with_tag(Tag::new(TagId::new(1), "history"))
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let gw = server();
        assert_eq!(gw.login("alice", "secret").await.unwrap(), "abc123");
        assert!(gw.login("alice", "wrong").await.unwrap_err().is_unauthorized());
        assert_eq!(gw.call_count(Operation::Login), 2);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let gw = server();
        assert!(gw.list_books("stale").await.unwrap_err().is_unauthorized());
        assert!(gw.who_am_i("stale").await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn create_book_resolves_and_creates_tags() {
        let gw = server();
        let tags: TagSelection = ["history", "rome"].into_iter().collect();
        let draft = BookDraft::from_form("SPQR", "Mary Beard", "4", "", &tags).unwrap();

        let book = gw.create_book("abc123", &draft).await.unwrap();
        assert_eq!(book.id, BookId::new(1));
        assert_eq!(book.tags[0].id, TagId::new(1));
        assert_eq!(book.tags[1], Tag::new(TagId::new(2), "rome"));
        assert_eq!(gw.tags().len(), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let gw = server();
        gw.fail(Operation::ListTags, 500);
        let err = gw.list_tags("abc123").await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        gw.recover(Operation::ListTags);
        assert_eq!(gw.list_tags("abc123").await.unwrap().len(), 1);

        gw.fail(Operation::WhoAmI, 401);
        assert!(gw.who_am_i("abc123").await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn duplicate_tag_and_username_rejected() {
        let gw = server();
        assert_eq!(
            gw.create_tag("abc123", "history").await.unwrap_err().status(),
            Some(400)
        );
        assert_eq!(
            gw.register("alice", "pw").await.unwrap_err().status(),
            Some(400)
        );
    }
}
