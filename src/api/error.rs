use thiserror::Error;

/// Failure classes for calls against the card-vault API. `Unauthorized` is
/// the only variant that may touch session state: every call site funnels it
/// into `SessionStore::reconcile`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ApiError {
    /// 401 from a protected endpoint; the local session is stale.
    #[error("not signed in: {0}")]
    Unauthorized(String),

    /// Any other 4xx; the server message is surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    /// Transport failure; nothing is retried automatically.
    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// 5xx or an undecodable success body.
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Message shown to the user, with the generic fallback applied when the
    /// server supplied nothing useful.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthorized(msg) | Self::Validation(msg) | Self::Unexpected(msg) => {
                if msg.trim().is_empty() {
                    fallback.to_string()
                } else {
                    msg.clone()
                }
            }
            Self::Network(_) | Self::Timeout => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Validation("Invalid card number".to_string());
        assert_eq!(err.user_message("Failed to store card"), "Invalid card number");
    }

    #[test]
    fn test_user_message_falls_back_when_blank_or_transport() {
        let err = ApiError::Validation("  ".to_string());
        assert_eq!(err.user_message("Failed to store card"), "Failed to store card");

        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.user_message("Failed to store card"), "Failed to store card");

        assert_eq!(ApiError::Timeout.user_message("Request failed"), "Request failed");
    }
}
