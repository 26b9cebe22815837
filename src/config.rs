//! Configuration loader and validator.
//!
//! Settings come from an optional YAML file, then command-line flags and
//! their environment fallbacks override individual fields.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::{MediaKind, Mode};

pub const DEFAULT_DAYS: i64 = 365;
pub const DEFAULT_JELLYFIN_URL: &str = "http://localhost:8096";
pub const DEFAULT_SONARR_URL: &str = "http://localhost:8989";
pub const DEFAULT_RADARR_URL: &str = "http://localhost:7878";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub app: App,
    pub jellyfin: Jellyfin,
    pub sonarr: Catalog,
    pub radarr: Catalog,
}

/// Run policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    /// Age threshold in days; unwatched media older than this is stale.
    pub days: i64,
    pub dry_run: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            dry_run: true,
        }
    }
}

/// Media server connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Jellyfin {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl Default for Jellyfin {
    fn default() -> Self {
        Self {
            url: DEFAULT_JELLYFIN_URL.into(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Sonarr or Radarr connection. A catalog without an API key is disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Catalog {
    pub url: String,
    pub api_key: String,
}

impl Catalog {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub days: Option<i64>,
    /// `Some(false)` from `DRY_RUN=false` switches to live mode.
    pub dry_run: Option<bool>,
    pub execute: bool,
    pub jellyfin_url: Option<String>,
    pub jellyfin_username: Option<String>,
    pub jellyfin_password: Option<String>,
    pub sonarr_url: Option<String>,
    pub sonarr_api_key: Option<String>,
    pub radarr_url: Option<String>,
    pub radarr_api_key: Option<String>,
}

impl Config {
    pub fn apply(&mut self, o: Overrides) {
        if let Some(days) = o.days {
            self.app.days = days;
        }
        if let Some(dry_run) = o.dry_run {
            self.app.dry_run = dry_run;
        }
        // --execute wins over any dry-run setting.
        if o.execute {
            self.app.dry_run = false;
        }
        let set = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *slot = v;
            }
        };
        set(&mut self.jellyfin.url, o.jellyfin_url);
        set(&mut self.jellyfin.username, o.jellyfin_username);
        set(&mut self.jellyfin.password, o.jellyfin_password);
        set(&mut self.sonarr.url, o.sonarr_url);
        set(&mut self.sonarr.api_key, o.sonarr_api_key);
        set(&mut self.radarr.url, o.radarr_url);
        set(&mut self.radarr.api_key, o.radarr_api_key);

        if self.sonarr.url.trim().is_empty() {
            self.sonarr.url = DEFAULT_SONARR_URL.into();
        }
        if self.radarr.url.trim().is_empty() {
            self.radarr.url = DEFAULT_RADARR_URL.into();
        }
    }

    pub fn mode(&self) -> Mode {
        if self.app.dry_run {
            Mode::DryRun
        } else {
            Mode::Live
        }
    }

    /// Media kinds whose catalog is configured, series first.
    pub fn enabled_kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::new();
        if self.sonarr.is_enabled() {
            kinds.push(MediaKind::Series);
        }
        if self.radarr.is_enabled() {
            kinds.push(MediaKind::Movies);
        }
        kinds
    }
}

/// Load configuration from a YAML file. Without a path, defaults are used.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        }
        None => Ok(Config::default()),
    }
}

/// Load, apply overrides and validate.
pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
    let mut cfg = load(path)?;
    cfg.apply(overrides);
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.days < 0 {
        return Err(ConfigError::Invalid("app.days must be >= 0"));
    }

    if cfg.jellyfin.url.trim().is_empty() {
        return Err(ConfigError::Invalid("jellyfin.url must be non-empty"));
    }
    if reqwest::Url::parse(cfg.jellyfin.url.trim()).is_err() {
        return Err(ConfigError::Invalid("jellyfin.url must be a valid URL"));
    }
    if cfg.jellyfin.username.trim().is_empty() {
        return Err(ConfigError::Invalid("jellyfin.username must be non-empty"));
    }

    if !cfg.sonarr.is_enabled() && !cfg.radarr.is_enabled() {
        return Err(ConfigError::Invalid(
            "no catalog configured: set sonarr.api_key and/or radarr.api_key",
        ));
    }
    if cfg.sonarr.is_enabled() && reqwest::Url::parse(cfg.sonarr.url.trim()).is_err() {
        return Err(ConfigError::Invalid("sonarr.url must be a valid URL"));
    }
    if cfg.radarr.is_enabled() && reqwest::Url::parse(cfg.radarr.url.trim()).is_err() {
        return Err(ConfigError::Invalid("radarr.url must be a valid URL"));
    }

    Ok(())
}

/// Sample configuration file.
pub fn example() -> &'static str {
    r#"app:
  days: 365
  dry_run: true

jellyfin:
  url: "http://localhost:8096"
  username: "admin"
  password: "YOUR_JELLYFIN_PASSWORD"

sonarr:
  url: "http://localhost:8989"
  api_key: "YOUR_SONARR_API_KEY"

radarr:
  url: "http://localhost:7878"
  api_key: "YOUR_RADARR_API_KEY"
"#
}
