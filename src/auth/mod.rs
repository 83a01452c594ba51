//! Authentication flow controller. All writes to the session store go
//! through this module: login persists the session and verifies it was
//! actually established, registration chains into login as a two-step saga
//! with its own registered-but-not-signed-in outcome, and logout clears
//! unconditionally.

use crate::api::{ApiClient, ApiError};
use crate::session::{Identity, Role, Session, SessionStore};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{instrument, warn};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the credentials or the request; the message is the
    /// server's when it supplied one.
    #[error("{0}")]
    Rejected(String),

    /// Login was accepted but the follow-up session check did not confirm an
    /// established session.
    #[error("session was not established; sign in again")]
    VerifyFailed,

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Registration and the chained sign-in are reported as distinct outcomes.
#[derive(Debug)]
pub enum RegisterOutcome {
    SignedIn {
        message: String,
        session: Session,
    },
    /// The account exists but sign-in failed; the user proceeds to manual
    /// login.
    RegisteredOnly {
        message: String,
        login_error: AuthError,
    },
}

pub struct AuthFlow<'s> {
    api: ApiClient,
    store: &'s mut SessionStore,
    state: AuthState,
}

impl<'s> AuthFlow<'s> {
    #[must_use]
    pub fn new(api: ApiClient, store: &'s mut SessionStore) -> Self {
        let state = if store.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        };

        Self { api, store, state }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Exchanges credentials for a session, persists it, and confirms with a
    /// follow-up `/session/check`. On rejection the store is untouched; on a
    /// failed verification it is cleared again.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        self.state = AuthState::Authenticating;

        let (summary, cookie) = match self.api.login(username, password).await {
            Ok(ok) => ok,
            Err(err) => {
                let message = err.user_message("Login failed");
                self.state = AuthState::Failed(message.clone());

                return Err(match err {
                    ApiError::Unauthorized(_) | ApiError::Validation(_) => {
                        AuthError::Rejected(message)
                    }
                    other => AuthError::Api(other),
                });
            }
        };

        let role = Role::parse(&summary.role);

        if role.is_none() {
            // fail closed: authenticated but without role capabilities
            warn!(role = %summary.role, "server reported an unrecognized role");
        }

        self.api.set_cookie(cookie.clone());

        let session = Session {
            identity: Identity {
                user_id: summary.user_id,
                username: username.to_string(),
            },
            role,
            cookie,
        };

        self.store.set(session.clone())?;

        match self.api.session_check().await {
            Ok(check) if check.logged_in => {
                self.state = AuthState::Authenticated;
                Ok(session)
            }
            Ok(_) | Err(ApiError::Unauthorized(_)) => {
                self.store.clear()?;
                self.state = AuthState::Failed("session was not established".to_string());
                Err(AuthError::VerifyFailed)
            }
            Err(err) => {
                // cannot confirm the session; do not keep optimistic state
                self.store.clear()?;
                self.state = AuthState::Failed(err.user_message("Login failed"));
                Err(AuthError::Api(err))
            }
        }
    }

    /// Creates the account, then chains into [`AuthFlow::login`] with the
    /// same credentials. Registration alone never authenticates.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<RegisterOutcome, AuthError> {
        let message = match self.api.register(username, email, password).await {
            Ok(message) if !message.trim().is_empty() => message,
            Ok(_) => "Account created".to_string(),
            Err(err) => {
                let message = err.user_message("Register failed");
                self.state = AuthState::Failed(message.clone());

                return Err(match err {
                    ApiError::Unauthorized(_) | ApiError::Validation(_) => {
                        AuthError::Rejected(message)
                    }
                    other => AuthError::Api(other),
                });
            }
        };

        match self.login(username, password).await {
            Ok(session) => Ok(RegisterOutcome::SignedIn { message, session }),
            Err(login_error) => Ok(RegisterOutcome::RegisteredOnly {
                message,
                login_error,
            }),
        }
    }

    /// Best-effort server logout followed by an unconditional local clear.
    #[instrument(skip_all)]
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Err(err) = self.api.logout().await {
            warn!("logout request failed, clearing local session anyway: {err}");
        }

        self.store.clear()?;
        self.state = AuthState::Anonymous;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_flow_reflects_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path().join("session.json"));

        let api = ApiClient::new("https://vault.example.com", None).unwrap();
        let flow = AuthFlow::new(api, &mut store);
        assert_eq!(flow.state(), &AuthState::Anonymous);

        let mut store = SessionStore::load(dir.path().join("session.json"));
        store
            .set(Session {
                identity: Identity {
                    user_id: 1,
                    username: "ada".to_string(),
                },
                role: Some(Role::Admin),
                cookie: None,
            })
            .unwrap();

        let api = ApiClient::new("https://vault.example.com", None).unwrap();
        let flow = AuthFlow::new(api, &mut store);
        assert_eq!(flow.state(), &AuthState::Authenticated);
    }
}
