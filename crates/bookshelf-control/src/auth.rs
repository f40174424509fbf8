//! Home, login, and registration views.

use bookshelf_api::ApiError;
use bookshelf_core::{Credentials, ValidationError};

use crate::context::AppContext;
use crate::effect::{Effect, Notice};
use crate::field::TextField;
use crate::route::Route;
use crate::scope::{Completion, ViewScope};

/// Send signed-in users straight to their books.
fn redirect_if_signed_in(ctx: &AppContext) -> Vec<Effect> {
    if ctx.session().is_authenticated() {
        tracing::debug!("Session present; skipping to book list");
        vec![Effect::Navigate(Route::Books)]
    } else {
        Vec::new()
    }
}

/// The landing screen.
#[derive(Debug)]
pub struct HomeView {
    ctx: AppContext,
}

impl HomeView {
    /// Create the view.
    #[must_use]
    pub const fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Redirects to the book list when a token is present.
    #[must_use]
    pub fn activate(&self) -> Vec<Effect> {
        redirect_if_signed_in(&self.ctx)
    }
}

/// Which credentials input has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialField {
    /// Username input.
    #[default]
    Username,
    /// Password input.
    Password,
}

/// Username and password inputs shared by login and registration.
#[derive(Debug, Clone, Default)]
pub struct CredentialsForm {
    /// Username input.
    pub username: TextField,
    /// Password input. Render with `TextField::masked`.
    pub password: TextField,
    /// Focused input.
    pub focus: CredentialField,
    error: Option<ValidationError>,
}

impl CredentialsForm {
    /// The focused input.
    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            CredentialField::Username => &mut self.username,
            CredentialField::Password => &mut self.password,
        }
    }

    /// Switch focus between the two inputs.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            CredentialField::Username => CredentialField::Password,
            CredentialField::Password => CredentialField::Username,
        };
    }

    /// The validation problem from the last submit attempt.
    #[must_use]
    pub const fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn credentials(&mut self) -> Result<Credentials, ValidationError> {
        let result = Credentials::new(self.username.value(), self.password.value());
        self.error = result.as_ref().err().cloned();
        result
    }
}

fn failure_notice(message: &str, error: &ApiError, rejected: &str) -> Effect {
    let detail = match error {
        ApiError::Unauthorized => rejected.to_string(),
        ApiError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    };
    tracing::warn!(error = %error, "{message}");
    Effect::Notify(Notice::error(message).with_detail(detail))
}

/// The login form.
#[derive(Debug)]
pub struct LoginController {
    ctx: AppContext,
    scope: ViewScope,
    /// Credential inputs.
    pub form: CredentialsForm,
    submitting: bool,
}

impl LoginController {
    /// Create the view.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ViewScope::new(),
            form: CredentialsForm::default(),
            submitting: false,
        }
    }

    /// Redirects to the book list when a token is present.
    #[must_use]
    pub fn activate(&self) -> Vec<Effect> {
        redirect_if_signed_in(&self.ctx)
    }

    /// Whether a login request is out.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate and send the credentials.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if either input is blank; nothing is sent.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        if self.submitting {
            return Ok(());
        }
        let Credentials { username, password } = self.form.credentials()?;
        self.submitting = true;

        tracing::debug!(%username, "Logging in");
        let gateway = self.ctx.gateway();
        self.scope.spawn(async move {
            Completion::LoggedIn(gateway.login(&username, &password).await)
        });
        Ok(())
    }

    /// Wait for the login request.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.scope.next().await
    }

    /// Store the issued token and move on, or report the failure.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let Completion::LoggedIn(result) = completion else {
            return Vec::new();
        };
        self.submitting = false;

        let token = match result {
            Ok(token) => token,
            Err(e) => {
                return vec![failure_notice(
                    "Login failed!",
                    &e,
                    "Incorrect username or password",
                )]
            }
        };
        match self.ctx.session().store_token(&token) {
            Ok(()) => {
                tracing::info!(username = %self.form.username.value().trim(), "Logged in");
                vec![
                    Effect::success("Login successful!"),
                    Effect::Navigate(Route::Books),
                ]
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not store session token");
                vec![Effect::Notify(
                    Notice::error("Login failed!").with_detail(e.to_string()),
                )]
            }
        }
    }
}

/// The registration form.
#[derive(Debug)]
pub struct RegisterController {
    ctx: AppContext,
    scope: ViewScope,
    /// Credential inputs.
    pub form: CredentialsForm,
    submitting: bool,
}

impl RegisterController {
    /// Create the view.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ViewScope::new(),
            form: CredentialsForm::default(),
            submitting: false,
        }
    }

    /// Redirects to the book list when a token is present.
    #[must_use]
    pub fn activate(&self) -> Vec<Effect> {
        redirect_if_signed_in(&self.ctx)
    }

    /// Whether a registration request is out.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate and send the credentials.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if either input is blank; nothing is sent.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        if self.submitting {
            return Ok(());
        }
        let Credentials { username, password } = self.form.credentials()?;
        self.submitting = true;

        tracing::debug!(%username, "Registering");
        let gateway = self.ctx.gateway();
        self.scope.spawn(async move {
            Completion::Registered(gateway.register(&username, &password).await)
        });
        Ok(())
    }

    /// Wait for the registration request.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.scope.next().await
    }

    /// Report the outcome. Success leads to the login form; no token is
    /// stored.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let Completion::Registered(result) = completion else {
            return Vec::new();
        };
        self.submitting = false;

        match result {
            Ok(user) => {
                tracing::info!(username = %user.username, id = %user.id, "Registered");
                vec![
                    Effect::success("Registration successful!"),
                    Effect::Navigate(Route::Login),
                ]
            }
            Err(e) => vec![failure_notice(
                "Registration failed!",
                &e,
                "Registration rejected",
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookshelf_api::{MockGateway, Operation};

    use super::*;
    use crate::testing;

    fn server() -> Arc<MockGateway> {
        Arc::new(MockGateway::new().with_user("alice", "secret", "abc123"))
    }

    async fn login(ctx: AppContext, username: &str, password: &str) -> (LoginController, Vec<Effect>) {
        let mut view = LoginController::new(ctx);
        view.form.username.set(username);
        view.form.password.set(password);
        view.submit().unwrap();

        let mut effects = Vec::new();
        while let Some(completion) = view.next_completion().await {
            effects.extend(view.apply(completion));
        }
        (view, effects)
    }

    #[tokio::test]
    async fn login_stores_token_and_opens_books() {
        let gateway = server();
        let ctx = testing::context(&gateway, None);
        let (_, effects) = login(ctx.clone(), "alice", "secret").await;

        assert_eq!(
            effects,
            vec![
                Effect::success("Login successful!"),
                Effect::Navigate(Route::Books)
            ]
        );
        assert_eq!(ctx.session().token().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn bad_password_keeps_fields() {
        let gateway = server();
        let ctx = testing::context(&gateway, None);
        let (view, effects) = login(ctx.clone(), "alice", "wrong").await;

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Notify(notice) => {
                assert!(notice.is_error());
                assert_eq!(notice.message, "Login failed!");
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert_eq!(view.form.username.value(), "alice");
        assert_eq!(view.form.password.value(), "wrong");
        assert!(!view.is_submitting());
        assert!(ctx.session().token().is_none());
    }

    #[tokio::test]
    async fn blank_fields_never_reach_server() {
        let gateway = server();
        let mut view = LoginController::new(testing::context(&gateway, None));
        view.form.username.set("  ");
        view.form.password.set("secret");

        assert_eq!(
            view.submit(),
            Err(ValidationError::MissingField("username"))
        );
        assert!(view.form.error().is_some());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn existing_token_skips_the_forms() {
        let gateway = server();
        let ctx = testing::context(&gateway, Some("abc123"));

        assert_eq!(
            LoginController::new(ctx.clone()).activate(),
            vec![Effect::Navigate(Route::Books)]
        );
        assert_eq!(
            RegisterController::new(ctx.clone()).activate(),
            vec![Effect::Navigate(Route::Books)]
        );
        assert_eq!(
            HomeView::new(ctx).activate(),
            vec![Effect::Navigate(Route::Books)]
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn no_token_stays_put() {
        let gateway = server();
        let ctx = testing::context(&gateway, None);
        assert!(HomeView::new(ctx.clone()).activate().is_empty());
        assert!(LoginController::new(ctx).activate().is_empty());
    }

    #[tokio::test]
    async fn register_then_login_without_storing_token() {
        let gateway = server();
        let ctx = testing::context(&gateway, None);

        let mut view = RegisterController::new(ctx.clone());
        view.form.username.set("bob");
        view.form.toggle_focus();
        view.form.focused_mut().set("hunter2");
        view.submit().unwrap();
        let completion = view.next_completion().await.unwrap();
        let effects = view.apply(completion);

        assert_eq!(
            effects,
            vec![
                Effect::success("Registration successful!"),
                Effect::Navigate(Route::Login)
            ]
        );
        assert!(ctx.session().token().is_none());
        assert_eq!(gateway.call_count(Operation::Register), 1);

        let (_, effects) = login(ctx.clone(), "bob", "hunter2").await;
        assert!(effects.contains(&Effect::Navigate(Route::Books)));
        assert!(ctx.session().is_authenticated());
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let gateway = server();
        let mut view = RegisterController::new(testing::context(&gateway, None));
        view.form.username.set("alice");
        view.form.password.set("other");
        view.submit().unwrap();
        let completion = view.next_completion().await.unwrap();
        let effects = view.apply(completion);

        match effects.as_slice() {
            [Effect::Notify(notice)] => {
                assert_eq!(notice.message, "Registration failed!");
                assert_eq!(notice.detail.as_deref(), Some("Username already registered"));
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[tokio::test]
    async fn pending_login_blocks_resubmit() {
        let gateway = server();
        let mut view = LoginController::new(testing::context(&gateway, None));
        view.form.username.set("alice");
        view.form.password.set("secret");
        view.submit().unwrap();
        view.submit().unwrap();
        assert!(view.is_submitting());

        while let Some(completion) = view.next_completion().await {
            view.apply(completion);
        }
        assert_eq!(gateway.call_count(Operation::Login), 1);
    }
}
