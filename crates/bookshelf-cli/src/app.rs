//! Application state.
//!
//! `App` wraps the router with the bits of state that only matter to the
//! terminal: which panel has focus, whether the add-tag prompt is open,
//! and the spinner frame.

use std::time::Duration;

use bookshelf_control::{BooksScreen, Completion, Route, Router, Screen};

/// How often the UI redraws while idle.
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Which panel of the book screen has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The book list.
    #[default]
    Books,
    /// The tag filter panel.
    Tags,
}

impl Focus {
    /// Toggle to the other panel.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Books => Self::Tags,
            Self::Tags => Self::Books,
        }
    }
}

/// Input mode on the book screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys navigate and trigger commands.
    #[default]
    Normal,
    /// Keys go to the add-tag prompt.
    AddingTag,
}

/// Application state.
pub struct App {
    /// Mounted view and pending notices.
    pub router: Router,
    /// Server base URL, for the header.
    server_url: String,
    /// Which panel has focus.
    pub focus: Focus,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Animation frame counter for loading indicators.
    pub animation_frame: usize,
    /// Router mount count the terminal state was last reset for.
    mounted: u64,
}

impl App {
    /// Create a new application around a mounted router.
    #[must_use]
    pub fn new(router: Router, server_url: impl Into<String>) -> Self {
        let mounted = router.mounts();
        Self {
            router,
            server_url: server_url.into(),
            focus: Focus::default(),
            input_mode: InputMode::default(),
            should_quit: false,
            animation_frame: 0,
            mounted,
        }
    }

    /// Tick the animation frame (call on each render).
    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Get current spinner character for loading animation.
    #[must_use]
    pub fn spinner_char(&self) -> &'static str {
        const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    /// Server base URL.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The mounted route.
    #[must_use]
    pub const fn route(&self) -> Route {
        self.router.route()
    }

    /// The book screen, when mounted.
    #[must_use]
    pub const fn books(&self) -> Option<&BooksScreen> {
        match self.router.screen() {
            Screen::Books(screen) => Some(screen),
            Screen::Home(_) | Screen::Login(_) | Screen::Register(_) => None,
        }
    }

    /// Username confirmed by the route guard.
    #[must_use]
    pub fn signed_in_as(&self) -> Option<&str> {
        self.books().and_then(|b| b.guard.username())
    }

    /// Mount `route` and reset per-screen terminal state.
    pub fn navigate(&mut self, route: Route) {
        self.router.navigate(route);
        self.reset_view_state();
    }

    /// Apply a finished request, following any redirect it causes.
    pub fn apply(&mut self, completion: Completion) {
        self.router.apply(completion);
        if self.router.mounts() != self.mounted {
            self.reset_view_state();
        }
    }

    fn reset_view_state(&mut self) {
        self.mounted = self.router.mounts();
        self.focus = Focus::default();
        self.input_mode = InputMode::Normal;
    }
}
