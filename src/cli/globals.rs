use std::env;
use std::path::PathBuf;

/// Arguments shared by every subcommand: where the API lives and where the
/// session record is persisted.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
        }
    }
}

/// Default session file path: `$HOME/.cardvault/session.json`, falling back
/// to the system temp directory when HOME is unset.
#[must_use]
pub fn default_session_file() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || env::temp_dir().join("cardvault-session.json"),
        |home| PathBuf::from(home).join(".cardvault").join("session.json"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://vault.tld:8443".to_string(),
            PathBuf::from("/tmp/session.json"),
        );

        assert_eq!(args.api_url, "https://vault.tld:8443");
        assert_eq!(args.session_file, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_default_session_file_under_home() {
        temp_env::with_vars([("HOME", Some("/home/ada"))], || {
            assert_eq!(
                default_session_file(),
                PathBuf::from("/home/ada/.cardvault/session.json")
            );
        });
    }

    #[test]
    fn test_default_session_file_without_home() {
        temp_env::with_vars([("HOME", None::<String>)], || {
            let path = default_session_file();
            assert!(path.ends_with("cardvault-session.json"));
        });
    }
}
