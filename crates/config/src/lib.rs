//! Server configuration.
//!
//! `shifttrack-server` reads `shifttrack.toml` (every field optional) and then
//! lets environment variables override individual values, so a container can
//! run without any file at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shifttrack_core::{WeekStart, join_code};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "shifttrack.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration (persisted as `shifttrack.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL; when unset it is derived from the port.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: None,
            data_dir: default_data_dir(),
            web_dir: default_web_dir(),
        }
    }
}

impl ServerSettings {
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret for access tokens. Empty disables login.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_true")]
    pub registration_open: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            registration_open: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingSettings {
    #[serde(default)]
    pub week_starts_on: WeekStart,
    #[serde(default = "default_join_code_length")]
    pub join_code_length: usize,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            week_starts_on: WeekStart::Monday,
            join_code_length: default_join_code_length(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    3000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_web_dir() -> PathBuf {
    PathBuf::from("web/build")
}
fn default_join_code_length() -> usize {
    join_code::DEFAULT_LENGTH
}

impl ServerConfig {
    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "PORT",
                reason: format!("'{port}' is not a port number"),
            })?;
        }
        if let Some(url) = get("BASE_URL") {
            self.server.base_url = Some(url);
        }
        if let Some(dir) = get("SHIFTTRACK_DATA_DIR") {
            self.server.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("SHIFTTRACK_WEB_DIR") {
            self.server.web_dir = PathBuf::from(dir);
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(mode) = get("SHIFTTRACK_REGISTRATION") {
            self.auth.registration_open = mode.trim() != "closed";
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.scheduling.join_code_length;
        if !(join_code::MIN_LENGTH..=join_code::MAX_LENGTH).contains(&len) {
            return Err(ConfigError::Invalid {
                field: "scheduling.join_code_length",
                reason: format!(
                    "{len} is outside {}..={}",
                    join_code::MIN_LENGTH,
                    join_code::MAX_LENGTH
                ),
            });
        }
        Ok(())
    }
}
