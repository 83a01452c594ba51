//! HTTP client for the card-vault API. One struct per session: the base URL
//! and the opaque session cookie captured at login. The cookie is attached to
//! every request and never inspected; no module outside this one sees it.

pub mod admin;
pub mod auth;
pub mod cards;
pub mod customers;
pub mod error;
pub mod merchants;

pub use error::ApiError;

use crate::APP_USER_AGENT;
use anyhow::Result;
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Abort budget for every request; a hung call must not hang the client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    cookie: Option<String>,
}

// The cookie is a server credential; keep it out of trace output.
impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, cookie: Option<String>) -> Result<Self> {
        let base = Url::parse(base_url)?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base, cookie })
    }

    /// Swaps the session cookie, typically right after login.
    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn attach(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .attach(self.http.get(self.endpoint(path)))
            .send()
            .await
            .map_err(map_transport)?;

        handle_json(response).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .attach(self.http.post(self.endpoint(path)))
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        handle_json(response).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .attach(self.http.post(self.endpoint(path)))
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(error_from(status, response).await)
        }
    }
}

pub(crate) fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

pub(crate) async fn handle_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Unexpected(format!("decoding response: {err}")))
    } else {
        Err(error_from(status, response).await)
    }
}

/// Maps a failed response onto the error taxonomy, surfacing the server's
/// `error` field when it has one.
pub(crate) async fn error_from(status: StatusCode, response: reqwest::Response) -> ApiError {
    let body: Value = response.json().await.unwrap_or_default();

    let message = body["error"]
        .as_str()
        .unwrap_or_default()
        .trim()
        .to_string();

    match status {
        StatusCode::UNAUTHORIZED => {
            if message.is_empty() {
                ApiError::Unauthorized("session expired or not signed in".to_string())
            } else {
                ApiError::Unauthorized(message)
            }
        }
        code if code.is_client_error() => {
            if message.is_empty() {
                ApiError::Validation(format!("request rejected ({status})"))
            } else {
                ApiError::Validation(message)
            }
        }
        _ => {
            if message.is_empty() {
                ApiError::Unexpected(format!("server returned {status}"))
            } else {
                ApiError::Unexpected(format!("{status}: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new("https://vault.example.com/", None).unwrap();

        assert_eq!(
            client.endpoint("/card/list"),
            "https://vault.example.com/card/list"
        );
        assert_eq!(
            client.endpoint("card/list/7"),
            "https://vault.example.com/card/list/7"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ApiClient::new("not a url", None).is_err());
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let client = ApiClient::new(
            "https://vault.example.com",
            Some("session=supersecret".to_string()),
        )
        .unwrap();

        let printed = format!("{client:?}");
        assert!(!printed.contains("supersecret"));
        assert!(printed.contains("redacted"));
    }

    #[tokio::test]
    async fn test_error_mapping_per_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/card/list"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Session expired"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/customer/list"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/merchant/list"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": "Invalid card number (13-19 digits)"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/session/check"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/admin/all_data"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), None).unwrap();

        // 401 carries the server message when there is one
        let err = client.get::<Value>("/card/list").await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized("Session expired".to_string()));

        // 401 with no body falls back to the generic message
        let err = client.get::<Value>("/customer/list").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Unauthorized("session expired or not signed in".to_string())
        );

        // other 4xx surface the server's error field verbatim
        let err = client.get::<Value>("/merchant/list").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation("Invalid card number (13-19 digits)".to_string())
        );

        // 4xx without an error field still maps to a rejection
        let err = client.get::<Value>("/session/check").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation("request rejected (422 Unprocessable Entity)".to_string())
        );

        // 5xx is neither a rejection nor a session problem
        let err = client.get::<Value>("/admin/all_data").await.unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_cookie_is_attached_to_requests() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/session/check"))
            .and(wiremock::matchers::header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged_in": true})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Some("session=abc123".to_string())).unwrap();

        let body: Value = client.get("/session/check").await.unwrap();
        assert_eq!(body["logged_in"], true);
    }
}
