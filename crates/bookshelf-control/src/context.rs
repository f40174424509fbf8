//! Shared dependencies handed to every mounted view.

use std::fmt;
use std::sync::Arc;

use bookshelf_api::ApiGateway;
use bookshelf_auth::SessionContext;

/// The gateway and session every controller works against.
///
/// Cloning is cheap: both halves are shared handles.
#[derive(Clone)]
pub struct AppContext {
    gateway: Arc<dyn ApiGateway>,
    session: SessionContext,
}

impl AppContext {
    /// Bundle a gateway with a session.
    #[must_use]
    pub fn new(gateway: Arc<dyn ApiGateway>, session: SessionContext) -> Self {
        Self { gateway, session }
    }

    /// A handle to the gateway, suitable for moving into a spawned request.
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn ApiGateway> {
        Arc::clone(&self.gateway)
    }

    /// The session holding the bearer token.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
