//! Keyboard handling.
//!
//! Keys are routed by what is on screen: a pending notice swallows
//! everything until dismissed, then the mounted route decides.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use bookshelf_control::{BookListController, FormField, Route, Screen, TextField};

use crate::app::{App, Focus, InputMode};

/// Handle a terminal event.
pub fn handle_event(app: &mut App, event: Event) {
    if let Event::Key(key) = event {
        // Only handle key press events
        if key.kind == KeyEventKind::Press {
            handle_key(app, key);
        }
    }
}

/// Handle a key press.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Notices are modal.
    if app.router.notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.router.dismiss_notice();
        }
        return;
    }

    match app.route() {
        Route::Home => handle_home(app, key.code),
        Route::Login | Route::Register => handle_credentials(app, key),
        Route::Books => handle_books(app, key),
    }
}

fn handle_home(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('l') => app.navigate(Route::Login),
        KeyCode::Char('r') => app.navigate(Route::Register),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_credentials(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.navigate(Route::Home);
            return;
        }
        // Ctrl+R: jump to the other form
        KeyCode::Char('r') if ctrl => {
            let other = if app.route() == Route::Login {
                Route::Register
            } else {
                Route::Login
            };
            app.navigate(other);
            return;
        }
        _ => {}
    }

    match app.router.screen_mut() {
        Screen::Login(view) => match key.code {
            KeyCode::Enter => {
                if let Err(e) = view.submit() {
                    tracing::debug!(error = %e, "Login form incomplete");
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                view.form.toggle_focus();
            }
            _ => {
                edit_text(view.form.focused_mut(), key);
            }
        },
        Screen::Register(view) => match key.code {
            KeyCode::Enter => {
                if let Err(e) = view.submit() {
                    tracing::debug!(error = %e, "Registration form incomplete");
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                view.form.toggle_focus();
            }
            _ => {
                edit_text(view.form.focused_mut(), key);
            }
        },
        Screen::Home(_) | Screen::Books(_) => {}
    }
}

fn handle_books(app: &mut App, key: KeyEvent) {
    let Screen::Books(screen) = app.router.screen_mut() else {
        return;
    };

    // Nothing but quitting until the guard has decided.
    if !screen.guard.is_admitted() {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            app.should_quit = true;
        }
        return;
    }

    let list = &mut screen.list;
    if list.form.is_visible() {
        handle_book_form(list, key);
        return;
    }

    if app.input_mode == InputMode::AddingTag {
        match key.code {
            KeyCode::Esc => {
                list.new_tag.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => match list.submit_tag() {
                Ok(()) => app.input_mode = InputMode::Normal,
                Err(e) => tracing::debug!(error = %e, "Tag name rejected"),
            },
            _ => {
                edit_text(&mut list.new_tag, key);
            }
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('a') => list.toggle_form(),
        KeyCode::Char('e') => {
            list.edit_selected();
        }
        KeyCode::Char('t') => app.input_mode = InputMode::AddingTag,
        KeyCode::Char('c') => list.clear_filter(),
        KeyCode::Tab | KeyCode::BackTab => app.focus = app.focus.next(),
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::Books => list.select_prev(),
            Focus::Tags => list.tag_cursor_prev(),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::Books => list.select_next(),
            Focus::Tags => list.tag_cursor_next(),
        },
        KeyCode::Enter | KeyCode::Char(' ') => match app.focus {
            Focus::Books => {
                list.edit_selected();
            }
            Focus::Tags => list.toggle_highlighted_filter(),
        },
        _ => {}
    }
}

fn handle_book_form(list: &mut BookListController, key: KeyEvent) {
    let on_tags = list.form.focus == FormField::Tags;
    match key.code {
        KeyCode::Esc => list.toggle_form(),
        KeyCode::Tab => list.form.focus_next(),
        KeyCode::BackTab => list.form.focus_prev(),
        KeyCode::Enter => {
            if let Err(e) = list.submit_form() {
                tracing::debug!(error = %e, "Book form rejected");
            }
        }
        KeyCode::Up if on_tags => list.form_tag_cursor_prev(),
        KeyCode::Down if on_tags => list.form_tag_cursor_next(),
        KeyCode::Char(' ') if on_tags => list.toggle_form_tag_at_cursor(),
        KeyCode::Up => list.form.focus_prev(),
        KeyCode::Down => list.form.focus_next(),
        _ => {
            if let Some(field) = list.form.focused_mut() {
                edit_text(field, key);
            }
        }
    }
}

/// Apply an editing key to a text field. Returns `false` if the key is not
/// an editing key.
fn edit_text(field: &mut TextField, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        // Ctrl+A / Ctrl+E: start / end, Ctrl+U: clear
        KeyCode::Char('a') if ctrl => field.home(),
        KeyCode::Char('e') if ctrl => field.end(),
        KeyCode::Char('u') if ctrl => field.clear(),
        KeyCode::Char(c) if !ctrl => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        _ => return false,
    }
    true
}
