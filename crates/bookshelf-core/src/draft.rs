//! Validated form payloads.
//!
//! Form fields arrive as raw text. Everything here turns that text into a
//! payload the API accepts, or a `ValidationError` explaining which field is
//! wrong, so that invalid submissions never reach the network.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::Book;
use crate::selection::TagSelection;

/// A book rating, always within `Rating::MIN..=Rating::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Return the numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let out_of_range = ValidationError::RatingOutOfRange {
            min: Self::MIN,
            max: Self::MAX,
            got: value,
        };
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(out_of_range),
        }
    }
}

impl FromStr for Rating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("rating"));
        }
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ValidationError::RatingNotANumber(trimmed.to_string()))?;
        Self::try_from(value)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The body sent when creating or updating a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDraft {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty author.
    pub author: String,
    /// Validated rating.
    pub rating: Rating,
    /// Comment, sent as an empty string when absent.
    pub comment: String,
    /// Tag names in selection order.
    pub tags: Vec<String>,
}

impl BookDraft {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns the first failing field: title, then author, then rating.
    pub fn from_form(
        title: &str,
        author: &str,
        rating: &str,
        comment: &str,
        tags: &TagSelection,
    ) -> Result<Self, ValidationError> {
        let title = required("title", title)?;
        let author = required("author", author)?;
        let rating: Rating = rating.parse()?;

        Ok(Self {
            title,
            author,
            rating,
            comment: comment.trim().to_string(),
            tags: tags.to_vec(),
        })
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            rating: Rating(book.rating.clamp(Rating::MIN, Rating::MAX)),
            comment: book.comment_text().to_string(),
            tags: book.tag_names().map(str::to_string).collect(),
        }
    }
}

/// Username and password for login or registration.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password, only ever sent to the server.
    pub password: String,
}

impl Credentials {
    /// Validate raw form input. Whitespace is significant in passwords and
    /// left untouched; the username is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if either field is blank.
    pub fn new(username: &str, password: &str) -> Result<Self, ValidationError> {
        let username = required("username", username)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(Self {
            username,
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validate a tag name typed into the add-tag form.
///
/// # Errors
///
/// Returns `MissingField` for a blank name and `DuplicateTag` when `existing`
/// already contains it.
pub fn tag_name<'a>(
    raw: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<String, ValidationError> {
    let name = required("tag name", raw)?;
    if existing.into_iter().any(|n| n == name) {
        return Err(ValidationError::DuplicateTag(name));
    }
    Ok(name)
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
