//! Mounting views and following redirects.
//!
//! The router owns exactly one mounted [`Screen`]. Navigating builds the
//! new screen, runs its activation, and drops the old one; the old view's
//! scope goes with it, aborting its requests.

use std::collections::VecDeque;

use crate::auth::{HomeView, LoginController, RegisterController};
use crate::books::BookListController;
use crate::context::AppContext;
use crate::effect::{Effect, Notice};
use crate::guard::RouteGuard;
use crate::route::Route;
use crate::scope::Completion;

/// Upper bound on back-to-back redirects from one navigation.
const MAX_REDIRECTS: usize = 8;

/// The guarded book view: a guard and the list it protects.
#[derive(Debug)]
pub struct BooksScreen {
    /// Token check; the list is inert until it admits.
    pub guard: RouteGuard,
    /// The list itself.
    pub list: BookListController,
}

impl BooksScreen {
    fn new(ctx: &AppContext) -> Self {
        Self {
            guard: RouteGuard::new(ctx.clone()),
            list: BookListController::new(ctx.clone()),
        }
    }

    async fn next_completion(&mut self) -> Option<Completion> {
        if self.guard.is_pending() {
            self.guard.next_completion().await
        } else {
            self.list.next_completion().await
        }
    }

    fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Probe(_) => {
                let effects = self.guard.apply(completion);
                if self.guard.is_admitted() {
                    self.list.activate();
                }
                effects
            }
            other if self.guard.is_admitted() => self.list.apply(other),
            other => {
                tracing::debug!(completion = ?other, "Dropping completion for unadmitted view");
                Vec::new()
            }
        }
    }
}

/// The mounted view.
#[derive(Debug)]
pub enum Screen {
    /// Landing screen.
    Home(HomeView),
    /// Login form.
    Login(LoginController),
    /// Registration form.
    Register(RegisterController),
    /// Guarded book list.
    Books(BooksScreen),
}

impl Screen {
    /// Build the view for `route` and activate it.
    fn mount(route: Route, ctx: &AppContext) -> (Self, Vec<Effect>) {
        match route {
            Route::Home => {
                let view = HomeView::new(ctx.clone());
                let effects = view.activate();
                (Self::Home(view), effects)
            }
            Route::Login => {
                let view = LoginController::new(ctx.clone());
                let effects = view.activate();
                (Self::Login(view), effects)
            }
            Route::Register => {
                let view = RegisterController::new(ctx.clone());
                let effects = view.activate();
                (Self::Register(view), effects)
            }
            Route::Books => {
                let mut view = BooksScreen::new(ctx);
                let effects = view.guard.start();
                (Self::Books(view), effects)
            }
        }
    }

    /// The route this screen serves.
    #[must_use]
    pub const fn route(&self) -> Route {
        match self {
            Self::Home(_) => Route::Home,
            Self::Login(_) => Route::Login,
            Self::Register(_) => Route::Register,
            Self::Books(_) => Route::Books,
        }
    }

    async fn next_completion(&mut self) -> Option<Completion> {
        match self {
            Self::Home(_) => None,
            Self::Login(view) => view.next_completion().await,
            Self::Register(view) => view.next_completion().await,
            Self::Books(view) => view.next_completion().await,
        }
    }

    fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        match self {
            Self::Home(_) => Vec::new(),
            Self::Login(view) => view.apply(completion),
            Self::Register(view) => view.apply(completion),
            Self::Books(view) => view.apply(completion),
        }
    }
}

/// Owns the mounted screen and the queue of notices.
#[derive(Debug)]
pub struct Router {
    ctx: AppContext,
    screen: Screen,
    notices: VecDeque<Notice>,
    mounts: u64,
}

impl Router {
    /// Mount `initial`, following any redirect it asks for.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(ctx: AppContext, initial: Route) -> Self {
        let (screen, effects) = Screen::mount(initial, &ctx);
        let mut router = Self {
            ctx,
            screen,
            notices: VecDeque::new(),
            mounts: 1,
        };
        router.run(effects, 0);
        router
    }

    /// The mounted route.
    #[must_use]
    pub const fn route(&self) -> Route {
        self.screen.route()
    }

    /// The mounted screen.
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The mounted screen, for input handling.
    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// How many screens have been mounted so far, counting remounts of the
    /// same route.
    #[must_use]
    pub const fn mounts(&self) -> u64 {
        self.mounts
    }

    /// The shared context.
    #[must_use]
    pub const fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Replace the mounted screen with a fresh `route`.
    pub fn navigate(&mut self, route: Route) {
        self.go(route, 0);
    }

    fn go(&mut self, route: Route, depth: usize) {
        if depth > MAX_REDIRECTS {
            tracing::warn!(%route, "Too many redirects; staying put");
            return;
        }
        tracing::info!(from = %self.route(), to = %route, "Navigating");
        let (screen, effects) = Screen::mount(route, &self.ctx);
        self.screen = screen;
        self.mounts += 1;
        self.run(effects, depth);
    }

    fn run(&mut self, effects: Vec<Effect>, depth: usize) {
        for effect in effects {
            match effect {
                Effect::Notify(notice) => self.notices.push_back(notice),
                Effect::Navigate(route) => self.go(route, depth + 1),
                Effect::SignIn => self.sign_in(),
            }
        }
    }

    /// Mount the login form without its signed-in redirect.
    fn sign_in(&mut self) {
        tracing::info!(from = %self.route(), "Session unverified; showing login");
        self.screen = Screen::Login(LoginController::new(self.ctx.clone()));
        self.mounts += 1;
    }

    /// Carry out effects produced outside a completion.
    pub fn dispatch(&mut self, effects: Vec<Effect>) {
        self.run(effects, 0);
    }

    /// Wait for the mounted screen's next finished request.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.screen.next_completion().await
    }

    /// Apply a completion to the mounted screen and carry out its effects.
    pub fn apply(&mut self, completion: Completion) {
        let effects = self.screen.apply(completion);
        self.run(effects, 0);
    }

    /// Apply completions until the mounted screen has nothing in flight.
    pub async fn settle(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.apply(completion);
        }
    }

    /// The notice to show, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    /// Acknowledge the current notice.
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Notices waiting to be acknowledged.
    #[must_use]
    pub fn pending_notices(&self) -> usize {
        self.notices.len()
    }
}
