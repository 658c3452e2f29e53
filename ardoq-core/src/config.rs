//! Client configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.ardoq/
//!   config.yaml   (host, token, org, timeout_secs)
//! ```
//!
//! Environment variables override the file: `ARDOQ_API_HOST`,
//! `ARDOQ_API_TOKEN`, `ARDOQ_ORG_LABEL`.
//!
//! # API pattern
//!
//! Every loader has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "https://app.ardoq.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_HOST: &str = "ARDOQ_API_HOST";
pub const ENV_TOKEN: &str = "ARDOQ_API_TOKEN";
pub const ENV_ORG: &str = "ARDOQ_ORG_LABEL";

/// Connection settings for the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            org: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Apply environment overrides using `lookup` (normally `std::env::var`).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        if let Some(org) = lookup(ENV_ORG).filter(|v| !v.is_empty()) {
            self.org = Some(org);
        }
        self
    }

    /// Check that the settings are usable for remote calls.
    ///
    /// `path` is only used to point the user at the file in error messages.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingToken {
                path: path.to_path_buf(),
            });
        }
        if self.host.trim_end_matches('/') == DEFAULT_HOST && self.org.is_none() {
            return Err(ConfigError::MissingOrg {
                host: self.host.clone(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The token reduced to its last four characters, for display.
    pub fn masked_token(&self) -> String {
        match self.token.as_deref() {
            None | Some("") => "<not set>".to_string(),
            Some(token) => {
                let tail: String = token
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("...{tail}")
            }
        }
    }
}

/// `<home>/.ardoq/config.yaml`, pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".ardoq").join("config.yaml")
}

/// Load the config file under `home`.
///
/// A missing file yields [`Config::default`]; environment overrides are not
/// applied here.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// Load, apply process environment overrides, and validate.
pub fn resolve_at(home: &Path) -> Result<Config, ConfigError> {
    let config = load_at(home)?.with_env_overrides(|key| std::env::var(key).ok());
    config.validate(&config_path_at(home))?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// `resolve_at` convenience wrapper.
pub fn resolve() -> Result<Config, ConfigError> {
    resolve_at(&home()?)
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_path_is_correct() {
        let home = TempDir::new().expect("tempdir");
        assert!(config_path_at(home.path()).ends_with(".ardoq/config.yaml"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = load_at(home.path()).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn env_overrides_file_values() {
        let config = Config {
            host: "https://file.example".into(),
            token: Some("file-token".into()),
            org: None,
            timeout_secs: 5,
        }
        .with_env_overrides(env(&[(ENV_TOKEN, "env-token"), (ENV_ORG, "acme")]));
        assert_eq!(config.host, "https://file.example");
        assert_eq!(config.token.as_deref(), Some("env-token"));
        assert_eq!(config.org.as_deref(), Some("acme"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = Config::default().with_env_overrides(env(&[(ENV_HOST, "")]));
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn validate_requires_token() {
        let err = Config::default()
            .validate(Path::new("/x/config.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken { .. }));
    }

    #[test]
    fn validate_requires_org_on_default_host() {
        let config = Config {
            token: Some("t".into()),
            ..Config::default()
        };
        let err = config.validate(Path::new("/x")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOrg { .. }));

        let private = Config {
            host: "https://ardoq.internal".into(),
            token: Some("t".into()),
            ..Config::default()
        };
        private.validate(Path::new("/x")).expect("private host needs no org");
    }

    #[test]
    fn masked_token_shows_last_four() {
        let config = Config {
            token: Some("abcdef123456".into()),
            ..Config::default()
        };
        assert_eq!(config.masked_token(), "...3456");
        assert_eq!(Config::default().masked_token(), "<not set>");
    }
}
