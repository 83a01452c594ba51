//! Login, registration, logout and session verification calls. Credentials
//! and the session cookie never reach trace output.

use super::{handle_json, map_transport, ApiClient, ApiError};
use reqwest::header::SET_COOKIE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

/// What `/login` reports on success; the role arrives as a raw string and is
/// normalized by the caller.
#[derive(Debug)]
pub struct LoginSummary {
    pub user_id: i64,
    pub role: String,
}

/// Body of `GET /session/check`.
#[derive(Debug, Deserialize)]
pub struct SessionCheck {
    pub logged_in: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// Exchanges credentials for a server session. Returns the identity
    /// summary and the session cookie the server set, if any.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<(LoginSummary, Option<String>), ApiError> {
        let payload = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let response = self
            .http
            .post(self.endpoint("/login"))
            .json(&payload)
            .send()
            .await
            .map_err(map_transport)?;

        // Cookie pairs only; attributes like Path or HttpOnly are for the
        // server's benefit and are not replayed.
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        let cookie = (!cookie.is_empty()).then_some(cookie);

        let body: Value = handle_json(response).await?;

        let user_id = body["user_id"]
            .as_i64()
            .ok_or_else(|| ApiError::Unexpected("no user_id in login response".to_string()))?;

        let role = body["role"]
            .as_str()
            .ok_or_else(|| ApiError::Unexpected("no role in login response".to_string()))?
            .to_string();

        Ok((LoginSummary { user_id, role }, cookie))
    }

    /// Creates an account. Registration alone does not authenticate; the
    /// caller chains into [`ApiClient::login`] separately.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<String, ApiError> {
        let payload = json!({
            "username": username,
            "email": email,
            "password": password.expose_secret(),
        });

        let response: RegisterResponse = self.post("/register", &payload).await?;

        Ok(response.message)
    }

    /// Asks the server whether the session behind the cookie is live.
    #[instrument(skip(self))]
    pub async fn session_check(&self) -> Result<SessionCheck, ApiError> {
        self.get("/session/check").await
    }

    /// Invalidates the server session. Callers treat failure as best-effort.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("/logout").await
    }
}
