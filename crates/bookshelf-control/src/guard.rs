//! Gate in front of protected views.
//!
//! The guard admits a view only after the server confirms the stored token
//! with `who_am_i`. Until then it is `Pending` and the view shows a loading
//! indicator instead of content. A missing token is denied without a
//! network call. A rejected token is cleared from the session so the next
//! mount starts from a clean slate.

use bookshelf_api::ApiError;

use crate::context::AppContext;
use crate::effect::{Effect, Notice};
use crate::route::Route;
use crate::scope::{Completion, ViewScope};

/// Where the guard stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Waiting for the server.
    #[default]
    Pending,
    /// The token was accepted.
    Admitted {
        /// Who the server says the token belongs to.
        username: String,
    },
    /// No usable session; the view must not render.
    Denied,
}

/// Token check for one mount of a protected view.
#[derive(Debug)]
pub struct RouteGuard {
    ctx: AppContext,
    scope: ViewScope,
    state: GuardState,
}

impl RouteGuard {
    /// A guard that has not checked anything yet.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ViewScope::new(),
            state: GuardState::Pending,
        }
    }

    /// Begin the check. Runs once per mount.
    ///
    /// With no stored token the guard denies immediately and asks for the
    /// login route; otherwise it issues one `who_am_i` call.
    pub fn start(&mut self) -> Vec<Effect> {
        if !matches!(self.state, GuardState::Pending) || !self.scope.is_idle() {
            return Vec::new();
        }
        if !self.ctx.session().is_authenticated() {
            tracing::debug!("No session token; denying access");
            self.state = GuardState::Denied;
            return vec![Effect::Navigate(Route::Login)];
        }
        self.scope.spawn_authorized(
            &self.ctx,
            |gw, token| async move { gw.who_am_i(&token).await },
            Completion::Probe,
        );
        Vec::new()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    /// Returns `true` while the check is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, GuardState::Pending)
    }

    /// Returns `true` once the token has been accepted.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self.state, GuardState::Admitted { .. })
    }

    /// The confirmed username, once admitted.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match &self.state {
            GuardState::Admitted { username } => Some(username),
            GuardState::Pending | GuardState::Denied => None,
        }
    }

    /// Wait for the probe to come back.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.scope.next().await
    }

    /// Fold the probe result into the guard.
    ///
    /// Results arriving after the guard has settled are ignored.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        if !self.is_pending() {
            tracing::debug!("Guard already settled; ignoring completion");
            return Vec::new();
        }
        let result = match completion {
            Completion::Probe(result) => result,
            other => {
                tracing::debug!(completion = ?other, "Guard ignoring unrelated completion");
                return Vec::new();
            }
        };

        match result {
            Ok(user) => {
                tracing::info!(username = %user.username, "Session accepted");
                self.state = GuardState::Admitted {
                    username: user.username,
                };
                Vec::new()
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("Session rejected by server");
                self.ctx.session().clear();
                self.state = GuardState::Denied;
                vec![Effect::Navigate(Route::Login)]
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed; denying access");
                self.state = GuardState::Denied;
                vec![
                    Effect::Notify(
                        Notice::error("Could not verify session!").with_detail(e.to_string()),
                    ),
                    Effect::SignIn,
                ]
            }
        }
    }
}
