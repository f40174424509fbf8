//! Request and response bodies that only exist on the wire.
//!
//! Catalog records themselves (`Book`, `Tag`, `User`) live in
//! `bookshelf-core`; these are the envelopes around them.

use serde::{Deserialize, Serialize};

/// Response from `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// Token scheme; the server always says "bearer".
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `POST /tags/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTag<'a> {
    /// Tag name.
    pub name: &'a str,
}

/// Error body returned by the API.
///
/// `detail` is a string for most errors and a list of field errors for
/// request validation failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error detail.
    pub detail: serde_json::Value,
}

impl ApiErrorResponse {
    /// Render the detail as a single line.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| item.to_string(), str::to_string)
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"detail": "Username already registered"}"#).unwrap();
        assert_eq!(body.message(), "Username already registered");
    }

    #[test]
    fn validation_detail() {
        let body: ApiErrorResponse = serde_json::from_str(
            r#"{"detail": [
                {"loc": ["body", "rating"], "msg": "field required", "type": "value_error.missing"},
                {"loc": ["body", "title"], "msg": "str type expected", "type": "type_error.str"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.message(), "field required; str type expected");
    }

    #[test]
    fn token_response_without_type() {
        let body: TokenResponse = serde_json::from_str(r#"{"access_token": "abc123"}"#).unwrap();
        assert_eq!(body.access_token, "abc123");
        assert!(body.token_type.is_none());
    }
}
