//! The gateway trait and its HTTP implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use bookshelf_core::{Book, BookDraft, BookId, Credentials, Tag, User};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::types::{ApiErrorResponse, NewTag, TokenResponse};

/// Every call the client makes against the catalog API.
///
/// This trait abstracts the HTTP layer, allowing for mock implementations in
/// tests. Authenticated calls take the bearer token explicitly; the gateway
/// holds no session state of its own.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for bad credentials, a request failure otherwise.
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns a request failure if the username is taken or the call fails.
    async fn register(&self, username: &str, password: &str) -> Result<User>;

    /// Identity probe: who does this token belong to?
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is no longer accepted.
    async fn who_am_i(&self, token: &str) -> Result<User>;

    /// List the user's books.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is rejected, a request failure otherwise.
    async fn list_books(&self, token: &str) -> Result<Vec<Book>>;

    /// Create a book.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is rejected, a request failure otherwise.
    async fn create_book(&self, token: &str, draft: &BookDraft) -> Result<Book>;

    /// Replace the fields of an existing book.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is rejected, a request failure otherwise.
    async fn update_book(&self, token: &str, id: BookId, draft: &BookDraft) -> Result<Book>;

    /// List the user's tags.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is rejected, a request failure otherwise.
    async fn list_tags(&self, token: &str) -> Result<Vec<Tag>>;

    /// Create a tag.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is rejected, a request failure otherwise.
    async fn create_tag(&self, token: &str, name: &str) -> Result<Tag>;
}

/// Client for the catalog REST API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    list_limit: u32,
}

impl HttpGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, config.base_url, config.list_limit))
    }

    /// Create a gateway with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>, list_limit: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            list_limit,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request, attaching the bearer token when given.
    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token)?);
        }
        Ok(builder)
    }

    /// Send a request and decode a JSON body from a successful response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%method, path, error = %e, "Request failed");
            ApiError::Http(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Err(Self::handle_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Handle API error responses.
    async fn handle_error(response: Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let message = match response.json::<ApiErrorResponse>().await {
            Ok(body) => body.message(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn page(&self) -> [(&'static str, u32); 2] {
        [("skip", 0), ("limit", self.list_limit)]
    }
}

fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let builder = self
            .request(Method::POST, "/token", None)?
            .form(&[("username", username), ("password", password)]);

        let body: TokenResponse = self.send(Method::POST, "/token", builder).await?;
        Ok(body.access_token)
    }

    async fn register(&self, username: &str, password: &str) -> Result<User> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let builder = self
            .request(Method::POST, "/users/", None)?
            .json(&credentials);

        self.send(Method::POST, "/users/", builder).await
    }

    async fn who_am_i(&self, token: &str) -> Result<User> {
        let builder = self.request(Method::GET, "/user/", Some(token))?;
        self.send(Method::GET, "/user/", builder).await
    }

    async fn list_books(&self, token: &str) -> Result<Vec<Book>> {
        let builder = self
            .request(Method::GET, "/books/", Some(token))?
            .query(&self.page());
        self.send(Method::GET, "/books/", builder).await
    }

    async fn create_book(&self, token: &str, draft: &BookDraft) -> Result<Book> {
        let builder = self
            .request(Method::POST, "/books/", Some(token))?
            .json(draft);
        self.send(Method::POST, "/books/", builder).await
    }

    async fn update_book(&self, token: &str, id: BookId, draft: &BookDraft) -> Result<Book> {
        let path = format!("/books/{id}");
        let builder = self.request(Method::PUT, &path, Some(token))?.json(draft);
        self.send(Method::PUT, &path, builder).await
    }

    async fn list_tags(&self, token: &str) -> Result<Vec<Tag>> {
        let builder = self
            .request(Method::GET, "/tags/", Some(token))?
            .query(&self.page());
        self.send(Method::GET, "/tags/", builder).await
    }

    async fn create_tag(&self, token: &str, name: &str) -> Result<Tag> {
        let builder = self
            .request(Method::POST, "/tags/", Some(token))?
            .json(&NewTag { name });
        self.send(Method::POST, "/tags/", builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::TagSelection;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(ApiConfig::new(server.uri())).unwrap()
    }

    fn book_json(id: i64, title: &str, tags: &[(i64, &str)]) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "author": "Frank Herbert",
            "rating": 5,
            "comment": "",
            "owner_id": 1,
            "tags": tags.iter().map(|(id, name)| json!({"id": id, "name": name})).collect::<Vec<_>>(),
        })
    }

    #[tokio::test]
    async fn login_posts_form_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc123", "token_type": "bearer"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = gateway(&server).await.login("alice", "secret").await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect username or password"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).await.login("alice", "nope").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn register_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/"))
            .and(body_json(json!({"username": "bob", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 2, "username": "bob", "books": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let user = gateway(&server).await.register("bob", "pw").await.unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.id.get(), 2);
    }

    #[tokio::test]
    async fn register_conflict_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Username already registered"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).await.register("bob", "pw").await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Username already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn authenticated_calls_send_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let user = gateway(&server).await.who_am_i("abc123").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn list_books_requests_a_full_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books/"))
            .and(query_param("skip", "0"))
            .and(query_param("limit", "100"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                book_json(1, "Dune", &[(1, "sci-fi")]),
                book_json(2, "Children of Dune", &[]),
            ])))
            .mount(&server)
            .await;

        let books = gateway(&server).await.list_books("abc123").await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].tags[0].name, "sci-fi");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).await.list_books("stale").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn create_and_update_book_send_draft() {
        let server = MockServer::start().await;
        let tags: TagSelection = ["sci-fi"].into_iter().collect();
        let draft = BookDraft::from_form("Dune", "Frank Herbert", "5", "", &tags).unwrap();
        let expected = json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "rating": 5,
            "comment": "",
            "tags": ["sci-fi"],
        });

        Mock::given(method("POST"))
            .and(path("/books/"))
            .and(body_json(expected.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(book_json(7, "Dune", &[(1, "sci-fi")])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/books/7"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(book_json(7, "Dune", &[(1, "sci-fi")])))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server).await;
        let created = gw.create_book("abc123", &draft).await.unwrap();
        assert_eq!(created.id, BookId::new(7));
        let updated = gw.update_book("abc123", created.id, &draft).await.unwrap();
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn tags_list_and_create() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tags/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "history"}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tags/"))
            .and(body_json(json!({"name": "sci-fi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "name": "sci-fi"})))
            .mount(&server)
            .await;

        let gw = gateway(&server).await;
        assert_eq!(gw.list_tags("abc123").await.unwrap().len(), 1);
        let tag = gw.create_tag("abc123", "sci-fi").await.unwrap();
        assert_eq!(tag, Tag::new(bookshelf_core::TagId::new(2), "sci-fi"));
    }

    #[tokio::test]
    async fn server_error_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tags/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = gateway(&server).await.list_tags("abc123").await.unwrap_err();
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "API error (500): Internal Server Error");
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = gateway(&server).await.list_books("abc123").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let gw = HttpGateway::with_client(Client::new(), "http://localhost:8000/", 10);
        assert_eq!(gw.base_url(), "http://localhost:8000");
        let err = gw
            .request(Method::GET, "/user/", Some("bad\ntoken"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
