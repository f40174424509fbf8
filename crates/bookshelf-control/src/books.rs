//! The book list.
//!
//! On activation the controller fetches books and tags as two independent
//! requests. It keeps both collections plus a filter selection, and derives
//! the visible list from them on every access. The add/edit form and the
//! add-tag input validate locally before anything is sent.

use bookshelf_api::ApiError;
use bookshelf_core::draft::tag_name;
use bookshelf_core::{filter_books, Book, BookDraft, BookId, Tag, TagSelection, ValidationError};

use crate::context::AppContext;
use crate::effect::{Effect, Notice};
use crate::field::TextField;
use crate::route::Route;
use crate::scope::{Completion, ViewScope};

/// Whether the form creates a new book or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// Submitting creates a book.
    #[default]
    Create,
    /// Submitting updates the book with this id.
    Edit(BookId),
}

/// Form field with keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    /// Title input.
    #[default]
    Title,
    /// Author input.
    Author,
    /// Rating input.
    Rating,
    /// Comment input.
    Comment,
    /// Tag checklist.
    Tags,
}

impl FormField {
    /// The following field, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Title => Self::Author,
            Self::Author => Self::Rating,
            Self::Rating => Self::Comment,
            Self::Comment => Self::Tags,
            Self::Tags => Self::Title,
        }
    }

    /// The preceding field, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Title => Self::Tags,
            Self::Author => Self::Title,
            Self::Rating => Self::Author,
            Self::Comment => Self::Rating,
            Self::Tags => Self::Comment,
        }
    }
}

/// The add/edit book form.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    /// Title input.
    pub title: TextField,
    /// Author input.
    pub author: TextField,
    /// Rating input, validated as an integer in 1..=5 on submit.
    pub rating: TextField,
    /// Comment input.
    pub comment: TextField,
    /// Tags checked on the form. Independent of the list filter.
    pub tags: TagSelection,
    /// Focused field.
    pub focus: FormField,
    /// Highlighted row in the tag checklist.
    pub tag_cursor: usize,
    mode: FormMode,
    visible: bool,
    submitting: bool,
    error: Option<ValidationError>,
}

impl BookForm {
    /// Create or edit.
    #[must_use]
    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    /// Whether the form is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a submission is waiting for the server.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The validation problem from the last submit attempt.
    #[must_use]
    pub const fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// The focused text input, or `None` when the tag checklist has focus.
    pub fn focused_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Author => Some(&mut self.author),
            FormField::Rating => Some(&mut self.rating),
            FormField::Comment => Some(&mut self.comment),
            FormField::Tags => None,
        }
    }

    /// Move focus forward.
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Move focus backward.
    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Clear the inputs. An in-flight submission stays marked.
    fn reset(&mut self) {
        *self = Self {
            submitting: self.submitting,
            ..Self::default()
        };
    }

    fn load(&mut self, book: &Book) {
        *self = Self {
            title: TextField::with_value(book.title.as_str()),
            author: TextField::with_value(book.author.as_str()),
            rating: TextField::with_value(book.rating.to_string()),
            comment: TextField::with_value(book.comment_text()),
            tags: book.tag_names().collect(),
            mode: FormMode::Edit(book.id),
            visible: true,
            submitting: self.submitting,
            ..Self::default()
        };
    }

    fn draft(&self) -> Result<BookDraft, ValidationError> {
        BookDraft::from_form(
            self.title.value(),
            self.author.value(),
            self.rating.value(),
            self.comment.value(),
            &self.tags,
        )
    }
}

/// State and actions of the book list view.
#[derive(Debug)]
pub struct BookListController {
    ctx: AppContext,
    scope: ViewScope,
    books: Vec<Book>,
    tags: Vec<Tag>,
    filter: TagSelection,
    /// The add/edit form.
    pub form: BookForm,
    /// The add-tag input.
    pub new_tag: TextField,
    tag_error: Option<ValidationError>,
    tag_submitting: bool,
    loading_books: bool,
    loading_tags: bool,
    activated: bool,
    selected: usize,
    tag_cursor: usize,
}

impl BookListController {
    /// An empty, inactive controller.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ViewScope::new(),
            books: Vec::new(),
            tags: Vec::new(),
            filter: TagSelection::new(),
            form: BookForm::default(),
            new_tag: TextField::new(),
            tag_error: None,
            tag_submitting: false,
            loading_books: false,
            loading_tags: false,
            activated: false,
            selected: 0,
            tag_cursor: 0,
        }
    }

    /// Fetch books and tags. Only the first call does anything.
    pub fn activate(&mut self) {
        if self.activated {
            return;
        }
        self.activated = true;
        self.loading_books = true;
        self.loading_tags = true;
        tracing::debug!("Loading books and tags");

        self.scope.spawn_authorized(
            &self.ctx,
            |gw, token| async move { gw.list_books(&token).await },
            Completion::Books,
        );
        self.scope.spawn_authorized(
            &self.ctx,
            |gw, token| async move { gw.list_tags(&token).await },
            Completion::Tags,
        );
    }

    /// Whether `activate` has run.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether either bootstrap request is still out.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading_books || self.loading_tags
    }

    /// Every loaded book.
    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Every known tag.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The current filter selection.
    #[must_use]
    pub const fn filter(&self) -> &TagSelection {
        &self.filter
    }

    /// Books matching the filter.
    #[must_use]
    pub fn filtered_books(&self) -> Vec<&Book> {
        filter_books(&self.books, &self.filter)
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    /// Index of the highlighted row in the filtered list.
    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// The highlighted book.
    #[must_use]
    pub fn selected_book(&self) -> Option<&Book> {
        self.filtered_books().get(self.selected).copied()
    }

    /// Highlight the next book.
    pub fn select_next(&mut self) {
        let len = self.filtered_books().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    /// Highlight the previous book.
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Index of the highlighted tag in the filter panel.
    #[must_use]
    pub const fn tag_cursor(&self) -> usize {
        self.tag_cursor
    }

    /// The highlighted tag in the filter panel.
    #[must_use]
    pub fn highlighted_tag(&self) -> Option<&Tag> {
        self.tags.get(self.tag_cursor)
    }

    /// Highlight the next tag.
    pub fn tag_cursor_next(&mut self) {
        if self.tag_cursor + 1 < self.tags.len() {
            self.tag_cursor += 1;
        }
    }

    /// Highlight the previous tag.
    pub fn tag_cursor_prev(&mut self) {
        self.tag_cursor = self.tag_cursor.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_books().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.tag_cursor = self.tag_cursor.min(self.tags.len().saturating_sub(1));
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Add `name` to the filter, or remove it if already there.
    pub fn toggle_filter(&mut self, name: &str) {
        self.filter.toggle(name);
        self.clamp_selection();
    }

    /// Toggle the highlighted tag in the filter.
    pub fn toggle_highlighted_filter(&mut self) {
        if let Some(name) = self.highlighted_tag().map(|t| t.name.clone()) {
            self.toggle_filter(&name);
        }
    }

    /// Show every book again.
    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.clamp_selection();
    }

    // =========================================================================
    // Book form
    // =========================================================================

    /// Show or hide the form. Hiding an edit discards it.
    pub fn toggle_form(&mut self) {
        if self.form.visible {
            if matches!(self.form.mode, FormMode::Edit(_)) {
                self.form.reset();
            } else {
                self.form.visible = false;
            }
        } else {
            self.form.visible = true;
        }
    }

    /// Load book `id` into the form for editing.
    ///
    /// Returns `false` if no such book is loaded.
    pub fn edit_book(&mut self, id: BookId) -> bool {
        let Some(book) = self.books.iter().find(|b| b.id == id) else {
            return false;
        };
        self.form.load(book);
        true
    }

    /// Edit the highlighted book.
    pub fn edit_selected(&mut self) -> bool {
        match self.selected_book().map(|b| b.id) {
            Some(id) => self.edit_book(id),
            None => false,
        }
    }

    /// Check or uncheck `name` on the form.
    pub fn toggle_form_tag(&mut self, name: &str) {
        self.form.tags.toggle(name);
    }

    /// Check or uncheck the tag under the form's checklist cursor.
    pub fn toggle_form_tag_at_cursor(&mut self) {
        if let Some(tag) = self.tags.get(self.form.tag_cursor) {
            self.form.tags.toggle(&tag.name);
        }
    }

    /// Move the form's checklist cursor down.
    pub fn form_tag_cursor_next(&mut self) {
        if self.form.tag_cursor + 1 < self.tags.len() {
            self.form.tag_cursor += 1;
        }
    }

    /// Move the form's checklist cursor up.
    pub fn form_tag_cursor_prev(&mut self) {
        self.form.tag_cursor = self.form.tag_cursor.saturating_sub(1);
    }

    /// Validate the form and send it.
    ///
    /// A submission already in flight makes this a no-op.
    ///
    /// # Errors
    ///
    /// Returns the validation failure (also kept on the form); nothing is
    /// sent in that case.
    pub fn submit_form(&mut self) -> Result<(), ValidationError> {
        if self.form.submitting {
            tracing::debug!("Book submission already in flight");
            return Ok(());
        }
        let draft = self.form.draft().inspect_err(|e| {
            self.form.error = Some(e.clone());
        })?;
        self.form.error = None;
        self.form.submitting = true;

        match self.form.mode {
            FormMode::Create => {
                tracing::debug!(title = %draft.title, "Creating book");
                self.scope.spawn_authorized(
                    &self.ctx,
                    move |gw, token| async move { gw.create_book(&token, &draft).await },
                    Completion::BookCreated,
                );
            }
            FormMode::Edit(id) => {
                tracing::debug!(%id, "Updating book");
                self.scope.spawn_authorized(
                    &self.ctx,
                    move |gw, token| async move { gw.update_book(&token, id, &draft).await },
                    move |result| Completion::BookUpdated { id, result },
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Tag input
    // =========================================================================

    /// The validation problem from the last add-tag attempt.
    #[must_use]
    pub const fn tag_error(&self) -> Option<&ValidationError> {
        self.tag_error.as_ref()
    }

    /// Whether an add-tag request is waiting for the server.
    #[must_use]
    pub const fn is_tag_submitting(&self) -> bool {
        self.tag_submitting
    }

    /// Validate the add-tag input and send it.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank name and `DuplicateTag` for one
    /// already known; nothing is sent in either case.
    pub fn submit_tag(&mut self) -> Result<(), ValidationError> {
        if self.tag_submitting {
            tracing::debug!("Tag submission already in flight");
            return Ok(());
        }
        let name = tag_name(
            self.new_tag.value(),
            self.tags.iter().map(|t| t.name.as_str()),
        )
        .inspect_err(|e| {
            self.tag_error = Some(e.clone());
        })?;
        self.tag_error = None;
        self.tag_submitting = true;

        tracing::debug!(%name, "Creating tag");
        self.scope.spawn_authorized(
            &self.ctx,
            move |gw, token| async move { gw.create_tag(&token, &name).await },
            Completion::TagCreated,
        );
        Ok(())
    }

    // =========================================================================
    // Completions
    // =========================================================================

    /// Wait for the next request to finish.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.scope.next().await
    }

    /// Fold a finished request into the view.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let effects = match completion {
            Completion::Books(result) => {
                self.loading_books = false;
                match result {
                    Ok(books) => {
                        tracing::debug!(count = books.len(), "Books loaded");
                        self.books = books;
                        Vec::new()
                    }
                    Err(e) => self.failure("Failed to fetch books!", &e),
                }
            }
            Completion::Tags(result) => {
                self.loading_tags = false;
                match result {
                    Ok(tags) => {
                        tracing::debug!(count = tags.len(), "Tags loaded");
                        self.tags = tags;
                        Vec::new()
                    }
                    Err(e) => self.failure("Failed to fetch tags!", &e),
                }
            }
            Completion::BookCreated(result) => {
                self.form.submitting = false;
                match result {
                    Ok(book) => {
                        tracing::info!(id = %book.id, "Book added");
                        self.upsert(book);
                        if self.form.mode == FormMode::Create {
                            self.form.reset();
                        }
                        vec![Effect::success("Book added successfully!")]
                    }
                    Err(e) => self.failure("Failed to add book!", &e),
                }
            }
            Completion::BookUpdated { id, result } => {
                self.form.submitting = false;
                match result {
                    Ok(book) => {
                        tracing::info!(%id, "Book updated");
                        if let Some(slot) = self.books.iter_mut().find(|b| b.id == id) {
                            *slot = book;
                        } else {
                            tracing::warn!(%id, "Updated book is not in the loaded list");
                        }
                        if self.form.mode == FormMode::Edit(id) {
                            self.form.reset();
                        }
                        vec![Effect::success("Book updated successfully!")]
                    }
                    Err(e) => self.failure("Failed to update book!", &e),
                }
            }
            Completion::TagCreated(result) => {
                self.tag_submitting = false;
                match result {
                    Ok(tag) => {
                        tracing::info!(id = %tag.id, name = %tag.name, "Tag added");
                        if !self.tags.iter().any(|t| t.name == tag.name) {
                            self.tags.push(tag);
                        }
                        self.new_tag.clear();
                        vec![Effect::success("Tag added successfully!")]
                    }
                    Err(e) => self.failure("Failed to add tag!", &e),
                }
            }
            other => {
                tracing::debug!(completion = ?other, "Book list ignoring unrelated completion");
                Vec::new()
            }
        };
        self.reconcile_tags();
        self.clamp_selection();
        effects
    }

    /// Add or replace by id so a book is never listed twice.
    fn upsert(&mut self, book: Book) {
        match self.books.iter_mut().find(|b| b.id == book.id) {
            Some(slot) => *slot = book,
            None => self.books.push(book),
        }
    }

    /// Merge tags seen on books into the tag collection.
    fn reconcile_tags(&mut self) {
        for book in &self.books {
            for tag in &book.tags {
                if !self.tags.iter().any(|t| t.name == tag.name) {
                    tracing::debug!(name = %tag.name, "Adding tag seen on a book");
                    self.tags.push(tag.clone());
                }
            }
        }
    }

    fn failure(&self, message: &str, error: &ApiError) -> Vec<Effect> {
        if error.is_unauthorized() {
            tracing::info!("Session rejected; returning to login");
            self.ctx.session().clear();
            return vec![
                Effect::Notify(Notice::error(message)),
                Effect::Navigate(Route::Login),
            ];
        }
        tracing::warn!(error = %error, "{message}");
        vec![Effect::Notify(
            Notice::error(message).with_detail(error.to_string()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookshelf_api::{MockGateway, Operation};
    use bookshelf_core::TagId;

    use super::*;
    use crate::testing;

    fn book(id: i64, title: &str, tags: &[Tag]) -> Book {
        Book {
            id: BookId::new(id),
            title: title.to_string(),
            author: "Someone".to_string(),
            rating: 4,
            comment: None,
            owner_id: None,
            tags: tags.to_vec(),
        }
    }

    fn history() -> Tag {
        Tag::new(TagId::new(1), "history")
    }

    fn scifi() -> Tag {
        Tag::new(TagId::new(2), "sci-fi")
    }

    fn server() -> Arc<MockGateway> {
        Arc::new(
            MockGateway::new()
                .with_user("alice", "secret", "abc123")
                .with_tag(history())
                .with_tag(scifi())
                .with_book(book(1, "SPQR", &[history()]))
                .with_book(book(2, "Dune", &[scifi()]))
                .with_book(book(3, "Untagged", &[])),
        )
    }

    async fn drain(list: &mut BookListController) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(completion) = list.next_completion().await {
            effects.extend(list.apply(completion));
        }
        effects
    }

    async fn loaded(gateway: &Arc<MockGateway>, token: &str) -> BookListController {
        let mut list = BookListController::new(testing::context(gateway, Some(token)));
        list.activate();
        let effects = drain(&mut list).await;
        assert!(effects.is_empty(), "unexpected effects: {effects:?}");
        list
    }

    fn messages(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(n.message.as_str()),
                Effect::Navigate(_) | Effect::SignIn => None,
            })
            .collect()
    }

    fn fill(list: &mut BookListController, title: &str, rating: &str) {
        list.toggle_form();
        list.form.title.set(title);
        list.form.author.set("Mary Beard");
        list.form.rating.set(rating);
    }

    #[tokio::test]
    async fn bootstrap_loads_both_collections() {
        let gateway = server();
        let list = loaded(&gateway, "abc123").await;

        assert_eq!(list.books().len(), 3);
        assert_eq!(list.tags(), &[history(), scifi()]);
        assert!(!list.is_loading());
        assert_eq!(gateway.call_count(Operation::ListBooks), 1);
        assert_eq!(gateway.call_count(Operation::ListTags), 1);
    }

    #[tokio::test]
    async fn activate_runs_once() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;
        list.activate();
        assert!(list.next_completion().await.is_none());
        assert_eq!(gateway.call_count(Operation::ListBooks), 1);
    }

    #[tokio::test]
    async fn filtering_by_tag() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;
        assert_eq!(list.filtered_books().len(), 3);

        list.toggle_filter("history");
        let titles: Vec<_> = list.filtered_books().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["SPQR"]);

        list.toggle_filter("sci-fi");
        assert_eq!(list.filtered_books().len(), 2);

        list.clear_filter();
        assert_eq!(list.filtered_books().len(), 3);
    }

    #[tokio::test]
    async fn selection_stays_inside_filtered_list() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.selected_index(), 2);

        list.toggle_filter("sci-fi");
        assert_eq!(list.selected_index(), 0);
        assert_eq!(list.selected_book().map(|b| b.title.as_str()), Some("Dune"));
    }

    #[tokio::test]
    async fn create_appends_once_and_resets_form() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;
        list.toggle_filter("sci-fi");

        fill(&mut list, "Pompeii", "5");
        list.toggle_form_tag("history");
        list.submit_form().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Book added successfully!"]);
        let matching: Vec<_> = list.books().iter().filter(|b| b.title == "Pompeii").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].tags, vec![history()]);
        // Filter is on sci-fi, so the new history book stays hidden.
        assert!(list.filtered_books().iter().all(|b| b.title != "Pompeii"));

        assert!(!list.form.is_visible());
        assert!(list.form.title.is_empty());
        assert!(list.form.tags.is_empty());
        assert_eq!(list.form.mode(), FormMode::Create);
    }

    #[tokio::test]
    async fn invalid_rating_never_reaches_server() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        fill(&mut list, "Pompeii", "6");
        let err = list.submit_form().unwrap_err();
        assert!(matches!(err, ValidationError::RatingOutOfRange { got: 6, .. }));
        assert_eq!(list.form.error(), Some(&err));
        assert!(list.form.is_visible());
        assert!(!list.form.is_submitting());
        assert_eq!(gateway.call_count(Operation::CreateBook), 0);
        assert!(list.next_completion().await.is_none());
    }

    #[tokio::test]
    async fn edit_replaces_matching_entry() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        assert!(list.edit_book(BookId::new(2)));
        assert_eq!(list.form.mode(), FormMode::Edit(BookId::new(2)));
        assert_eq!(list.form.title.value(), "Dune");
        assert_eq!(list.form.rating.value(), "4");
        assert!(list.form.tags.contains("sci-fi"));

        list.form.title.set("Dune Messiah");
        list.submit_form().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Book updated successfully!"]);
        assert_eq!(list.books().len(), 3);
        let updated: Vec<_> = list
            .books()
            .iter()
            .filter(|b| b.id == BookId::new(2))
            .collect();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].title, "Dune Messiah");
        assert_eq!(list.form.mode(), FormMode::Create);
        assert!(!list.form.is_visible());
    }

    #[tokio::test]
    async fn unknown_book_cannot_be_edited() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;
        assert!(!list.edit_book(BookId::new(99)));
        assert!(!list.form.is_visible());
    }

    #[tokio::test]
    async fn hiding_an_edit_resets_the_form() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        list.edit_book(BookId::new(1));
        list.toggle_form();
        assert!(!list.form.is_visible());
        assert_eq!(list.form.mode(), FormMode::Create);
        assert!(list.form.title.is_empty());

        list.toggle_form();
        list.form.title.set("Draft");
        list.toggle_form();
        list.toggle_form();
        assert_eq!(list.form.title.value(), "Draft");
    }

    #[tokio::test]
    async fn hidden_edit_stays_in_flight_until_answered() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        list.edit_book(BookId::new(1));
        list.form.title.set("SPQR, revised");
        list.submit_form().unwrap();
        list.toggle_form();
        assert!(list.form.is_submitting());

        list.edit_book(BookId::new(2));
        list.form.title.set("Dune Messiah");
        list.submit_form().unwrap();
        assert_eq!(gateway.call_count(Operation::UpdateBook), 1);

        let effects = drain(&mut list).await;
        assert_eq!(messages(&effects), ["Book updated successfully!"]);
        assert_eq!(list.books()[0].title, "SPQR, revised");
        assert_eq!(list.form.mode(), FormMode::Edit(BookId::new(2)));
        assert_eq!(list.form.title.value(), "Dune Messiah");
        assert!(list.form.is_visible());
        assert!(!list.form.is_submitting());
    }

    #[tokio::test]
    async fn failed_create_keeps_state() {
        let gateway = server();
        gateway.fail(Operation::CreateBook, 500);
        let mut list = loaded(&gateway, "abc123").await;

        fill(&mut list, "Pompeii", "3");
        list.submit_form().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Failed to add book!"]);
        assert!(!effects.contains(&Effect::Navigate(Route::Login)));
        assert_eq!(list.books().len(), 3);
        assert!(list.form.is_visible());
        assert_eq!(list.form.title.value(), "Pompeii");
        assert!(!list.form.is_submitting());
    }

    #[tokio::test]
    async fn failed_update_keeps_state() {
        let gateway = server();
        gateway.fail(Operation::UpdateBook, 500);
        let mut list = loaded(&gateway, "abc123").await;

        list.edit_book(BookId::new(1));
        list.form.title.set("Changed");
        list.submit_form().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Failed to update book!"]);
        assert_eq!(list.books()[0].title, "SPQR");
        assert_eq!(list.form.mode(), FormMode::Edit(BookId::new(1)));
    }

    #[tokio::test]
    async fn second_submit_waits_for_the_first() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        fill(&mut list, "Pompeii", "5");
        list.submit_form().unwrap();
        list.submit_form().unwrap();
        drain(&mut list).await;

        assert_eq!(gateway.call_count(Operation::CreateBook), 1);
    }

    #[tokio::test]
    async fn invalid_token_clears_session() {
        let gateway = server();
        let ctx = testing::context(&gateway, Some("expired"));
        let mut list = BookListController::new(ctx.clone());
        list.activate();

        // Apply only the first failure; the router would unmount after it.
        let completion = list.next_completion().await.unwrap();
        let effects = list.apply(completion);

        assert!(effects.contains(&Effect::Navigate(Route::Login)));
        assert!(!ctx.session().is_authenticated());
    }

    #[tokio::test]
    async fn fetch_failures_are_reported_separately() {
        let gateway = server();
        gateway.fail(Operation::ListTags, 500);
        let mut list = BookListController::new(testing::context(&gateway, Some("abc123")));
        list.activate();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Failed to fetch tags!"]);
        assert_eq!(list.books().len(), 3);
        // Tags still show up, recovered from the books that carry them.
        assert_eq!(list.tags().len(), 2);
    }

    #[tokio::test]
    async fn tags_on_books_join_the_tag_collection() {
        let poetry = Tag::new(TagId::new(7), "poetry");
        let gateway = Arc::new(
            MockGateway::new()
                .with_user("alice", "secret", "abc123")
                .with_tag(history())
                .with_book(book(1, "Odes", &[poetry.clone()])),
        );
        let list = loaded(&gateway, "abc123").await;
        assert_eq!(list.tags(), &[history(), poetry]);
    }

    #[tokio::test]
    async fn add_tag_appends_and_clears_input() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_user("alice", "secret", "abc123")
                .with_tag(history()),
        );
        let mut list = loaded(&gateway, "abc123").await;

        list.new_tag.set("sci-fi");
        list.submit_tag().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Tag added successfully!"]);
        assert_eq!(list.tags(), &[history(), scifi()]);
        assert!(list.new_tag.is_empty());
        assert!(list.books().is_empty());
    }

    #[tokio::test]
    async fn duplicate_or_blank_tag_is_rejected_locally() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        list.new_tag.set("history");
        assert_eq!(
            list.submit_tag(),
            Err(ValidationError::DuplicateTag("history".to_string()))
        );
        list.new_tag.set("   ");
        assert!(matches!(
            list.submit_tag(),
            Err(ValidationError::MissingField(_))
        ));
        assert!(list.tag_error().is_some());
        assert_eq!(gateway.call_count(Operation::CreateTag), 0);
    }

    #[tokio::test]
    async fn failed_tag_add_keeps_input() {
        let gateway = server();
        gateway.fail(Operation::CreateTag, 500);
        let mut list = loaded(&gateway, "abc123").await;

        list.new_tag.set("poetry");
        list.submit_tag().unwrap();
        let effects = drain(&mut list).await;

        assert_eq!(messages(&effects), ["Failed to add tag!"]);
        assert_eq!(list.new_tag.value(), "poetry");
        assert_eq!(list.tags().len(), 2);
    }

    #[tokio::test]
    async fn form_and_filter_selections_are_independent() {
        let gateway = server();
        let mut list = loaded(&gateway, "abc123").await;

        list.toggle_filter("history");
        list.toggle_form();
        list.form.tag_cursor = 1;
        list.toggle_form_tag_at_cursor();

        assert!(list.form.tags.contains("sci-fi"));
        assert!(!list.form.tags.contains("history"));
        assert!(list.filter().contains("history"));
        assert!(!list.filter().contains("sci-fi"));
    }
}
