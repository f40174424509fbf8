//! Sets of selected tag names.
//!
//! The same type backs both the tags a book form will carry and the display
//! filter; the two are always separate instances.

use serde::{Deserialize, Serialize};

/// An insertion-ordered set of tag names.
///
/// Order matters only for what is sent to the server: tags are submitted in
/// the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSelection(Vec<String>);

impl TagSelection {
    /// Create an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Flip membership of `name`. Returns `true` if it is now selected.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|n| n == name) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(name.to_string());
            true
        }
    }

    /// Whether `name` is selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy the names out, in selection order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for name in iter {
            let name = name.into();
            if !selection.contains(&name) {
                selection.0.push(name);
            }
        }
        selection
    }
}
