//! Configuration types and loading
//!
//! Settings come from a TOML file; the account password is resolved from
//! the TM_PASSWORD env var or identity.password_file, never stored in the
//! TOML directly to avoid leaking secrets.

use common::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub club: ClubConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Ubisoft account used for authentication
#[derive(Debug, Deserialize)]
pub struct IdentityConfig {
    pub email: String,
    #[serde(skip)]
    pub password: Option<Secret>,
    /// Path to a file containing the password (alternative to TM_PASSWORD env var)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
}

/// Club whose leaderboards are shown
#[derive(Debug, Default, Deserialize)]
pub struct ClubConfig {
    /// Club id; when unset the account's first club membership is used
    #[serde(default)]
    pub id: Option<u64>,
}

/// Where tokens and the campaign cache live on disk
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Outbound HTTP settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timeout() -> u64 {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Password resolution order:
    /// 1. TM_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.identity.email.contains('@') {
            return Err(common::Error::Config(format!(
                "identity.email must be an email address, got: {}",
                config.identity.email
            )));
        }

        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "http.timeout_secs must be greater than 0".into(),
            ));
        }

        // Resolve the password: env var takes precedence over file
        if let Ok(password) = std::env::var("TM_PASSWORD") {
            let password = password.trim().to_owned();
            if !password.is_empty() {
                config.identity.password = Some(Secret::new(password));
            }
        } else if let Some(ref password_file) = config.identity.password_file {
            let password = std::fs::read_to_string(password_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read password_file {}: {e}",
                    password_file.display()
                ))
            })?;
            let password = password.trim().to_owned();
            if !password.is_empty() {
                config.identity.password = Some(Secret::new(password));
            }
        }

        if config.identity.password.is_none() {
            return Err(common::Error::Config(
                "no password configured: set TM_PASSWORD or identity.password_file".into(),
            ));
        }

        Ok(config)
    }

    /// User-Agent header for outbound requests. The Nadeo APIs ask callers
    /// to identify themselves with a contact address.
    pub fn user_agent(&self) -> String {
        match self.http.user_agent {
            Some(ref agent) => agent.clone(),
            None => format!(
                "{}/{} ({})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.identity.email
            ),
        }
    }

    /// Directory holding per-service token files.
    pub fn token_dir(&self) -> PathBuf {
        self.storage.data_dir.join("tokens")
    }

    /// Campaign cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.storage.data_dir.join("cache").join("weekly_shorts.json")
    }
}
