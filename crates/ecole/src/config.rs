//! Configuration read from the process environment.

use std::path::PathBuf;

use ecole_store::BackendKind;
use thiserror::Error;

pub const ENV_USE_REMOTE: &str = "ECOLE_USE_REMOTE";
pub const ENV_REMOTE_URL: &str = "ECOLE_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "ECOLE_REMOTE_KEY";
pub const ENV_DATA_DIR: &str = "ECOLE_DATA_DIR";
pub const ENV_SEED_PATH: &str = "ECOLE_SEED_PATH";

/// Errors in the environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when the remote backend is selected")]
    Missing(&'static str),

    #[error("unsupported remote url `{0}`, expected sqlite:, http:// or https://")]
    UnsupportedUrl(String),
}

/// Where the remote backend's rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTarget {
    /// Embedded SQLite database. `None` keeps it in memory.
    Sqlite(Option<PathBuf>),
    /// Hosted PostgREST service.
    Rest { url: String, api_key: String },
}

impl RemoteTarget {
    /// Interpret a remote URL and key.
    ///
    /// `sqlite::memory:` and `sqlite:<path>` select the embedded database;
    /// `http://` and `https://` select the REST service, which needs a key.
    pub fn parse(url: &str, api_key: Option<String>) -> Result<Self, ConfigError> {
        if let Some(path) = url.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            return Ok(if path.is_empty() || path == ":memory:" {
                RemoteTarget::Sqlite(None)
            } else {
                RemoteTarget::Sqlite(Some(PathBuf::from(path)))
            });
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            let api_key = api_key
                .filter(|k| !k.is_empty())
                .ok_or(ConfigError::Missing(ENV_REMOTE_KEY))?;
            return Ok(RemoteTarget::Rest {
                url: url.to_string(),
                api_key,
            });
        }
        Err(ConfigError::UnsupportedUrl(url.to_string()))
    }
}

/// Facade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchoolConfig {
    /// Set when the remote backend is selected.
    pub remote: Option<RemoteTarget>,
    /// Directory for the local backend's files. `None` keeps data in memory.
    pub data_dir: Option<PathBuf>,
    /// Seed fixture used instead of the built-in one.
    pub seed_path: Option<PathBuf>,
}

impl SchoolConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_remote = lookup(ENV_USE_REMOTE).as_deref() == Some("true");

        let remote = if use_remote {
            let url = lookup(ENV_REMOTE_URL)
                .filter(|u| !u.is_empty())
                .ok_or(ConfigError::Missing(ENV_REMOTE_URL))?;
            Some(RemoteTarget::parse(&url, lookup(ENV_REMOTE_KEY))?)
        } else {
            None
        };

        Ok(Self {
            remote,
            data_dir: lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()).map(PathBuf::from),
            seed_path: lookup(ENV_SEED_PATH).filter(|p| !p.is_empty()).map(PathBuf::from),
        })
    }

    /// The selected backend.
    pub fn backend(&self) -> BackendKind {
        if self.remote.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<SchoolConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SchoolConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_to_local_memory() {
        let config = config(&[]).unwrap();
        assert_eq!(config.backend(), BackendKind::Local);
        assert_eq!(config, SchoolConfig::default());
    }

    #[test]
    fn test_only_exact_true_selects_remote() {
        let config = config(&[(ENV_USE_REMOTE, "TRUE"), (ENV_DATA_DIR, "/var/lib/ecole")]).unwrap();
        assert_eq!(config.backend(), BackendKind::Local);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/ecole")));
    }

    #[test]
    fn test_remote_targets() {
        let rest = config(&[
            (ENV_USE_REMOTE, "true"),
            (ENV_REMOTE_URL, "https://abc.example.co"),
            (ENV_REMOTE_KEY, "anon"),
        ])
        .unwrap();
        assert_eq!(
            rest.remote,
            Some(RemoteTarget::Rest {
                url: "https://abc.example.co".to_string(),
                api_key: "anon".to_string()
            })
        );

        let sqlite = config(&[(ENV_USE_REMOTE, "true"), (ENV_REMOTE_URL, "sqlite:/tmp/e.db")]).unwrap();
        assert_eq!(
            sqlite.remote,
            Some(RemoteTarget::Sqlite(Some(PathBuf::from("/tmp/e.db"))))
        );

        let memory = config(&[(ENV_USE_REMOTE, "true"), (ENV_REMOTE_URL, "sqlite::memory:")]).unwrap();
        assert_eq!(memory.remote, Some(RemoteTarget::Sqlite(None)));
        assert_eq!(memory.backend(), BackendKind::Remote);
    }

    #[test]
    fn test_missing_remote_settings() {
        assert_eq!(
            config(&[(ENV_USE_REMOTE, "true")]),
            Err(ConfigError::Missing(ENV_REMOTE_URL))
        );
        assert_eq!(
            config(&[(ENV_USE_REMOTE, "true"), (ENV_REMOTE_URL, "https://x.example")]),
            Err(ConfigError::Missing(ENV_REMOTE_KEY))
        );
        assert!(matches!(
            config(&[(ENV_USE_REMOTE, "true"), (ENV_REMOTE_URL, "ftp://x")]),
            Err(ConfigError::UnsupportedUrl(_))
        ));
    }
}
