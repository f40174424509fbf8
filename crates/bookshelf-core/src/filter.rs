//! Tag-based filtering of the book list.

use crate::model::Book;
use crate::selection::TagSelection;

/// Derive the visible books for a filter selection.
///
/// An empty selection shows everything; otherwise a book is shown iff at
/// least one of its tag names is selected. Input order is preserved.
#[must_use]
pub fn filter_books<'a>(books: &'a [Book], selection: &TagSelection) -> Vec<&'a Book> {
    if selection.is_empty() {
        return books.iter().collect();
    }
    books
        .iter()
        .filter(|book| book.tag_names().any(|name| selection.contains(name)))
        .collect()
}
