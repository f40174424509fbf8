//! UI rendering with ratatui.
//!
//! One screen per route, a header with the server and the signed-in user,
//! a status bar with key hints, and modals for the book form, the add-tag
//! prompt, and notices.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use bookshelf_control::{
    BookListController, CredentialField, CredentialsForm, FormField, FormMode, GuardState,
    NoticeLevel, Route, Screen, TextField,
};
use bookshelf_core::{Book, Rating};

use crate::app::{App, Focus, InputMode};

/// Render the UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: vertical split for header, main content, and status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header_bar(frame, app, main_layout[0]);

    match app.router.screen() {
        Screen::Home(_) => render_home(frame, main_layout[1]),
        Screen::Login(view) => render_credentials(frame, " Log in ", &view.form, view.is_submitting(), main_layout[1]),
        Screen::Register(view) => render_credentials(frame, " Register ", &view.form, view.is_submitting(), main_layout[1]),
        Screen::Books(screen) => match screen.guard.state() {
            GuardState::Admitted { .. } => render_books(frame, app, &screen.list, main_layout[1]),
            GuardState::Pending | GuardState::Denied => render_checking(frame, app, main_layout[1]),
        },
    }

    render_status_bar(frame, app, main_layout[2]);

    if let Some(screen) = app.books() {
        if screen.list.form.is_visible() {
            render_book_form(frame, &screen.list, area);
        } else if app.input_mode == InputMode::AddingTag {
            render_tag_dialog(frame, &screen.list, area);
        }
    }

    // Notices sit above everything else
    render_notice(frame, app, area);
}

/// Convert a character count to a terminal column offset.
fn col(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Render the header bar with the app name, server, and user.
fn render_header_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "BOOKSHELF";
    let (user_text, user_style) = app.signed_in_as().map_or_else(
        || ("signed out".to_string(), Style::default().fg(Color::Gray)),
        |name| (name.to_string(), Style::default().fg(Color::Green)),
    );

    let right_text = format!("{} [{user_text}]", app.server_url());
    let padding = area
        .width
        .saturating_sub(col(title.len()) + col(right_text.chars().count()));

    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(usize::from(padding))),
        Span::raw(app.server_url()),
        Span::raw(" ["),
        Span::styled(user_text, user_style),
        Span::raw("]"),
    ]);

    let header = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Render the landing screen.
fn render_home(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(60, 40, area);
    let block = Block::default()
        .title(" Welcome ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        Line::from(Span::styled(
            "Your personal book catalog",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Keep track of what you read, rate it, and tag it."),
        Line::from(""),
        Line::from(vec![
            Span::styled("[l]", Style::default().fg(Color::Yellow)),
            Span::raw(" Log in   "),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw(" Register   "),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]),
    ];

    let text = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, dialog_area);
}

/// Render a login or registration form.
fn render_credentials(
    frame: &mut Frame,
    title: &str,
    form: &CredentialsForm,
    submitting: bool,
    area: Rect,
) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height.saturating_sub(2));
    let dialog_area = Rect::new(
        area.x + (area.width.saturating_sub(dialog_width)) / 2,
        area.y + (area.height.saturating_sub(dialog_height)) / 2,
        dialog_width,
        dialog_height,
    );

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Error / progress
            Constraint::Min(0),
        ])
        .split(inner);

    let username_focused = form.focus == CredentialField::Username;
    render_input_box(frame, "Username", form.username.value(), username_focused, layout[0]);
    render_input_box(frame, "Password", &form.password.masked(), !username_focused, layout[1]);

    let message = if submitting {
        Line::from(Span::styled("Submitting...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = form.error() {
        Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(message), layout[2]);

    let field = if username_focused {
        &form.username
    } else {
        &form.password
    };
    set_field_cursor(frame, field, if username_focused { layout[0] } else { layout[1] });
}

/// Render a bordered single-line input.
fn render_input_box(frame: &mut Frame, label: &str, value: &str, focused: bool, area: Rect) {
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        });
    let input = Paragraph::new(value.to_string())
        .style(Style::default().fg(Color::Yellow))
        .block(block);
    frame.render_widget(input, area);
}

/// Place the terminal cursor inside a bordered input.
fn set_field_cursor(frame: &mut Frame, field: &TextField, area: Rect) {
    frame.set_cursor_position((area.x + 1 + col(field.cursor()), area.y + 1));
}

/// Render the loading indicator shown while the session is checked.
fn render_checking(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(app.spinner_char(), Style::default().fg(Color::Yellow)),
        Span::styled(" Checking session...", Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, centered_rect(40, 20, area));
}

/// Render the tag panel and book list side by side.
fn render_books(frame: &mut Frame, app: &App, list: &BookListController, area: Rect) {
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // Left: Tags
            Constraint::Percentage(75), // Right: Books
        ])
        .split(area);

    render_tags_panel(frame, app, list, content_layout[0]);
    render_books_panel(frame, app, list, content_layout[1]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Render the tag filter panel.
fn render_tags_panel(frame: &mut Frame, app: &App, list: &BookListController, area: Rect) {
    let is_focused = app.focus == Focus::Tags;
    let title = if list.filter().is_empty() {
        " Tags ".to_string()
    } else {
        format!(" Tags ({} selected) ", list.filter().len())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(is_focused));

    let items: Vec<ListItem> = list
        .tags()
        .iter()
        .map(|tag| {
            let checked = list.filter().contains(&tag.name);
            let mark = if checked { "[x] " } else { "[ ] " };
            let style = if checked {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![Span::raw(mark), Span::styled(tag.name.as_str(), style)]))
        })
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if is_focused && !list.tags().is_empty() {
        state.select(Some(list.tag_cursor()));
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Stars for a rating, e.g. `★★★☆☆`.
fn stars(rating: u8) -> String {
    let filled = rating.min(Rating::MAX);
    format!(
        "{}{}",
        "★".repeat(usize::from(filled)),
        "☆".repeat(usize::from(Rating::MAX - filled))
    )
}

fn book_item(book: &Book) -> ListItem<'_> {
    let mut spans = vec![
        Span::styled(book.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" by "),
        Span::raw(book.author.as_str()),
        Span::raw("  "),
        Span::styled(stars(book.rating), Style::default().fg(Color::Yellow)),
    ];
    for name in book.tag_names() {
        spans.push(Span::styled(format!(" #{name}"), Style::default().fg(Color::Magenta)));
    }

    let mut lines = vec![Line::from(spans)];
    if !book.comment_text().is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", book.comment_text()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(Text::from(lines))
}

/// Render the (filtered) book list.
fn render_books_panel(frame: &mut Frame, app: &App, list: &BookListController, area: Rect) {
    let is_focused = app.focus == Focus::Books;
    let visible = list.filtered_books();

    let title = if list.is_loading() {
        format!(" Books {} ", app.spinner_char())
    } else if list.filter().is_empty() {
        format!(" Books ({}) ", list.books().len())
    } else {
        format!(" Books ({} of {}) ", visible.len(), list.books().len())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(is_focused));

    if visible.is_empty() && !list.is_loading() {
        let help = if list.books().is_empty() {
            "No books yet. Press [a] to add one."
        } else {
            "No books match the selected tags. Press [c] to clear the filter."
        };
        let text = Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = visible.into_iter().map(book_item).collect();
    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(list.selected_index()));
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Render the add/edit book modal.
fn render_book_form(frame: &mut Frame, list: &BookListController, area: Rect) {
    let form = &list.form;
    let tag_rows = col(list.tags().len().max(1)).min(8);
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = (4 * 3 + tag_rows + 2 + 2).min(area.height.saturating_sub(2));
    let dialog_area = Rect::new(
        area.x + (area.width.saturating_sub(dialog_width)) / 2,
        area.y + (area.height.saturating_sub(dialog_height)) / 2,
        dialog_width,
        dialog_height,
    );

    // Clear the background
    frame.render_widget(Clear, dialog_area);

    let title = match form.mode() {
        FormMode::Create => " Add Book ".to_string(),
        FormMode::Edit(id) => format!(" Edit Book #{id} "),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Title
            Constraint::Length(3),            // Author
            Constraint::Length(3),            // Rating
            Constraint::Length(3),            // Comment
            Constraint::Length(tag_rows + 2), // Tags
            Constraint::Length(1),            // Error / progress
        ])
        .split(inner);

    let fields: [(&str, &TextField, FormField); 4] = [
        ("Title", &form.title, FormField::Title),
        ("Author", &form.author, FormField::Author),
        ("Rating (1-5)", &form.rating, FormField::Rating),
        ("Comment", &form.comment, FormField::Comment),
    ];
    for (i, (label, field, which)) in fields.into_iter().enumerate() {
        let focused = form.focus == which;
        render_input_box(frame, label, field.value(), focused, layout[i]);
        if focused {
            set_field_cursor(frame, field, layout[i]);
        }
    }

    let tags_focused = form.focus == FormField::Tags;
    let items: Vec<ListItem> = if list.tags().is_empty() {
        vec![ListItem::new(Span::styled(
            "No tags yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        list.tags()
            .iter()
            .map(|tag| {
                let mark = if form.tags.contains(&tag.name) { "[x] " } else { "[ ] " };
                ListItem::new(format!("{mark}{}", tag.name))
            })
            .collect()
    };
    let tag_list = List::new(items)
        .block(
            Block::default()
                .title(" Tags (space to toggle) ")
                .borders(Borders::ALL)
                .border_style(focus_style(tags_focused)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if tags_focused && !list.tags().is_empty() {
        state.select(Some(form.tag_cursor));
    }
    frame.render_stateful_widget(tag_list, layout[4], &mut state);

    let message = if form.is_submitting() {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = form.error() {
        Span::styled(error.to_string(), Style::default().fg(Color::Red))
    } else {
        Span::styled(
            "Enter to save, Esc to cancel, Tab to move",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(message)), layout[5]);
}

/// Render the add-tag prompt.
fn render_tag_dialog(frame: &mut Frame, list: &BookListController, area: Rect) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 8.min(area.height.saturating_sub(4));
    let dialog_area = Rect::new(
        area.x + (area.width.saturating_sub(dialog_width)) / 2,
        area.y + (area.height.saturating_sub(dialog_height)) / 2,
        dialog_width,
        dialog_height,
    );

    // Clear the background
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Add Tag ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input box
            Constraint::Length(1), // Error / progress
            Constraint::Length(1), // Help text
        ])
        .split(inner);

    render_input_box(frame, "Tag name", list.new_tag.value(), true, layout[0]);
    set_field_cursor(frame, &list.new_tag, layout[0]);

    let message = if list.is_tag_submitting() {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = list.tag_error() {
        Span::styled(error.to_string(), Style::default().fg(Color::Red))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(message)), layout[1]);

    let help = Paragraph::new("Press Enter to add, Esc to cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, layout[2]);
}

/// Render the front notice, if any.
fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = app.router.notice() else {
        return;
    };
    let dialog_area = centered_rect(50, 30, area);

    // Clear the background
    frame.render_widget(Clear, dialog_area);

    let (title, color) = match notice.level {
        NoticeLevel::Success => (" Done ", Color::Green),
        NoticeLevel::Error => (" Error ", Color::Red),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let mut lines = vec![
        Line::from(Span::styled(
            notice.message.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(detail) = &notice.detail {
        lines.push(Line::from(Span::styled(detail.as_str(), Style::default().fg(Color::White))));
        lines.push(Line::from(""));
    }
    let more = app.router.pending_notices().saturating_sub(1);
    let help = if more > 0 {
        format!("Press Enter to dismiss ({more} more)")
    } else {
        "Press Enter to dismiss".to_string()
    };
    lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, dialog_area);
}

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ]
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let route = app.route();
    let mode_indicator = Span::styled(
        format!(" {} ", route.title().to_uppercase()),
        Style::default().fg(Color::Black).bg(match route {
            Route::Home => Color::Blue,
            Route::Login | Route::Register => Color::Magenta,
            Route::Books => Color::Green,
        }),
    );

    let hints: Vec<[Span<'static>; 2]> = if app.router.notice().is_some() {
        vec![key_hint("Enter", ":dismiss ")]
    } else {
        match route {
            Route::Home => vec![
                key_hint("l", ":log in "),
                key_hint("r", ":register "),
                key_hint("q", ":quit"),
            ],
            Route::Login | Route::Register => vec![
                key_hint("Enter", ":submit "),
                key_hint("Tab", ":next field "),
                key_hint("Ctrl+R", ":switch form "),
                key_hint("Esc", ":back"),
            ],
            Route::Books => match app.books() {
                Some(screen) if screen.list.form.is_visible() => vec![
                    key_hint("Enter", ":save "),
                    key_hint("Tab", ":next field "),
                    key_hint("Space", ":toggle tag "),
                    key_hint("Esc", ":cancel"),
                ],
                _ if app.input_mode == InputMode::AddingTag => {
                    vec![key_hint("Enter", ":add tag "), key_hint("Esc", ":cancel")]
                }
                _ => vec![
                    key_hint("a", ":add "),
                    key_hint("e", ":edit "),
                    key_hint("t", ":new tag "),
                    key_hint("c", ":clear filter "),
                    key_hint("Tab", ":switch "),
                    key_hint("q", ":quit"),
                ],
            },
        }
    };

    let mut spans = vec![mode_indicator, Span::raw(" ")];
    spans.extend(hints.into_iter().flatten());
    let status_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
