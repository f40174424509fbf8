//! Request tasks owned by a mounted view.
//!
//! Every request a view makes runs as a task in the view's `ViewScope`.
//! The scope lives exactly as long as the view: tearing it down aborts
//! whatever is still running and drops whatever already finished, so
//! results can only ever be applied to the view that asked for them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;

use bookshelf_api::{ApiError, ApiGateway, Result as ApiResult};
use bookshelf_core::{Book, BookId, Tag, User};

use crate::context::AppContext;

/// The outcome of one request, tagged with what it was for.
#[derive(Debug)]
pub enum Completion {
    /// Route guard's token check.
    Probe(ApiResult<User>),
    /// Book list bootstrap.
    Books(ApiResult<Vec<Book>>),
    /// Tag list bootstrap.
    Tags(ApiResult<Vec<Tag>>),
    /// Add-book submission.
    BookCreated(ApiResult<Book>),
    /// Edit-book submission for `id`.
    BookUpdated {
        /// The book being edited.
        id: BookId,
        /// Server response.
        result: ApiResult<Book>,
    },
    /// Add-tag submission.
    TagCreated(ApiResult<Tag>),
    /// Login submission; carries the issued token.
    LoggedIn(ApiResult<String>),
    /// Registration submission.
    Registered(ApiResult<User>),
}

/// The set of in-flight requests belonging to one mounted view.
#[derive(Default)]
pub struct ViewScope {
    tasks: JoinSet<Completion>,
}

impl ViewScope {
    /// An empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` as part of this view.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.tasks.spawn(request);
    }

    /// Run an authenticated call with the session's current token.
    ///
    /// With no token the call is never made; `complete` receives
    /// `ApiError::Unauthorized` instead, exactly as if the server had
    /// rejected it.
    pub fn spawn_authorized<T, Fut>(
        &mut self,
        ctx: &AppContext,
        call: impl FnOnce(Arc<dyn ApiGateway>, String) -> Fut,
        complete: impl FnOnce(ApiResult<T>) -> Completion + Send + 'static,
    ) where
        T: Send + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        if let Some(token) = ctx.session().token() {
            let request = call(ctx.gateway(), token);
            self.spawn(async move { complete(request.await) });
        } else {
            tracing::debug!("No session token; not sending request");
            self.spawn(async move { complete(Err(ApiError::Unauthorized)) });
        }
    }

    /// Number of requests not yet collected.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for the next request to finish.
    ///
    /// Returns `None` once the scope is idle. Aborted tasks are skipped.
    pub async fn next(&mut self) -> Option<Completion> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(completion) => return Some(completion),
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::error!(error = %e, "View request task failed"),
            }
        }
        None
    }

    /// Abort everything in flight and forget anything already finished.
    pub fn teardown(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(pending = self.tasks.len(), "Discarding view requests");
        }
        self.tasks.abort_all();
        self.tasks.detach_all();
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewScope")
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bookshelf_api::{MockGateway, Operation};

    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn delivers_completions_then_goes_idle() {
        let mut scope = ViewScope::new();
        scope.spawn(async { Completion::Books(Ok(Vec::new())) });
        scope.spawn(async { Completion::Tags(Ok(Vec::new())) });
        assert_eq!(scope.in_flight(), 2);

        let mut seen = 0;
        while let Some(completion) = scope.next().await {
            assert!(matches!(
                completion,
                Completion::Books(Ok(_)) | Completion::Tags(Ok(_))
            ));
            seen += 1;
        }
        assert_eq!(seen, 2);
        assert!(scope.is_idle());
    }

    #[tokio::test]
    async fn teardown_discards_finished_and_pending() {
        let mut scope = ViewScope::new();
        scope.spawn(async { Completion::Books(Ok(Vec::new())) });
        scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Completion::Tags(Ok(Vec::new()))
        });
        // Let the first task finish before tearing down.
        tokio::task::yield_now().await;

        scope.teardown();
        assert!(scope.is_idle());
        assert!(scope.next().await.is_none());
    }

    #[tokio::test]
    async fn missing_token_fails_locally() {
        let gateway = Arc::new(MockGateway::new());
        let ctx = testing::context(&gateway, None);

        let mut scope = ViewScope::new();
        scope.spawn_authorized(
            &ctx,
            |gw, token| async move { gw.list_books(&token).await },
            Completion::Books,
        );

        let completion = scope.next().await;
        assert!(matches!(
            completion,
            Some(Completion::Books(Err(ApiError::Unauthorized)))
        ));
        assert_eq!(gateway.call_count(Operation::ListBooks), 0);
    }

    #[tokio::test]
    async fn token_is_forwarded() {
        let gateway = Arc::new(MockGateway::new().with_user("alice", "secret", "abc123"));
        let ctx = testing::context(&gateway, Some("abc123"));

        let mut scope = ViewScope::new();
        scope.spawn_authorized(
            &ctx,
            |gw, token| async move { gw.who_am_i(&token).await },
            Completion::Probe,
        );

        match scope.next().await {
            Some(Completion::Probe(Ok(user))) => assert_eq!(user.username, "alice"),
            other => panic!("unexpected completion: {other:?}"),
        }
    }
}
