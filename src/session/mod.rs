//! Client-side mirror of the server session. The persisted file is a cache
//! for reload continuity only; the server session stays authoritative and any
//! 401 on a protected call must funnel into [`SessionStore::clear`].

use crate::api::ApiError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Coarse capability class gating navigation and data scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Merchant,
    Admin,
}

impl Role {
    /// Single normalizing constructor; the API has returned both "Merchant"
    /// and "merchant" over time, so parsing is case-insensitive. Unknown
    /// strings yield `None` and the caller fails closed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "merchant" => Some(Self::Merchant),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Merchant => "merchant",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one canonical identity record produced at login. No other field in
/// the crate carries "the current user id".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Identity, role and the opaque session cookie, persisted together as a
/// single record so they can never drift apart across a half-written update.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    /// `None` when the server reported a role the client does not recognize;
    /// the session stays usable but grants no role-specific capability.
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

/// File-backed session store. Only the auth flow writes it; every other
/// module reads through it.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
    epoch: u64,
}

impl SessionStore {
    /// Reconstructs the session from the persisted file. A missing or
    /// unreadable file is an unauthenticated store, not an error.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let current = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!("discarding unreadable session file: {err}");
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path,
            current,
            epoch: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.current.as_ref().map(|s| &s.identity)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().and_then(|s| s.role)
    }

    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.current.as_ref().and_then(|s| s.cookie.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Bumped by every `set` and `clear`; in-flight fetches compare it to
    /// decide whether their result is stale.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replaces the current session and persists it atomically: the record is
    /// written to a sibling temp file and renamed over the target, so a crash
    /// can never leave identity and role half-updated.
    pub fn set(&mut self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&session)?;
        let tmp = self.path.with_extension("tmp");

        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replacing {}", self.path.display()))?;

        self.current = Some(session);
        self.epoch += 1;

        debug!("session persisted to {}", self.path.display());

        Ok(())
    }

    /// Removes the persisted file and resets in-memory state. Idempotent: a
    /// second call leaves the same empty state as the first.
    pub fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("removing {}", self.path.display()))
            }
        }

        self.current = None;
        self.epoch += 1;

        Ok(())
    }

    /// The 401 funnel: a server rejection on a protected call always wins
    /// over local state. Returns true when the session was cleared.
    pub fn reconcile(&mut self, err: &ApiError) -> Result<bool> {
        if matches!(err, ApiError::Unauthorized(_)) {
            self.clear()?;
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::load(dir.path().join("session.json"))
    }

    fn sample_session() -> Session {
        Session {
            identity: Identity {
                user_id: 7,
                username: "ada".to_string(),
            },
            role: Some(Role::Customer),
            cookie: Some("session=abc123".to_string()),
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" merchant "), Some(Role::Merchant));
        assert_eq!(Role::parse("Customer"), Some(Role::Customer));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_load_missing_file_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(!store.is_authenticated());
        assert_eq!(store.role(), None);
        assert_eq!(store.epoch(), 0);
    }

    #[test]
    fn test_set_then_load_round_trips_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.set(sample_session()).unwrap();
        assert_eq!(store.epoch(), 1);

        let reloaded = SessionStore::load(store.path().to_path_buf());
        assert_eq!(reloaded.session(), Some(&sample_session()));
        assert_eq!(reloaded.role(), Some(Role::Customer));
        assert_eq!(reloaded.identity().map(|i| i.user_id), Some(7));
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"not json").unwrap();

        let store = SessionStore::load(path);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.set(sample_session()).unwrap();
        store.clear().unwrap();

        assert!(!store.is_authenticated());
        assert!(!store.path().exists());

        // a second clear leaves the identical empty state
        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_epoch_bumps_on_set_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.set(sample_session()).unwrap();
        let after_set = store.epoch();
        store.clear().unwrap();

        assert!(store.epoch() > after_set);
    }

    #[test]
    fn test_reconcile_clears_only_on_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set(sample_session()).unwrap();

        let cleared = store
            .reconcile(&ApiError::Validation("bad input".to_string()))
            .unwrap();
        assert!(!cleared);
        assert!(store.is_authenticated());

        let cleared = store
            .reconcile(&ApiError::Unauthorized("session expired".to_string()))
            .unwrap();
        assert!(cleared);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_unrecognized_role_stays_authenticated_without_role() {
        let mut session = sample_session();
        session.role = None;

        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set(session).unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.role(), None);
    }
}
