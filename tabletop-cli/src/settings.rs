//! Settings file: paths, matching thresholds and remote connection.
//!
//! Lookup order is `--config`, then `./tabletop.toml`, then
//! `~/.config/tabletop/settings.toml`, then built-in defaults. Missing
//! sections and fields take their defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabletop_bgg::ClientConfig;
use tabletop_bgg::client::{DEFAULT_BASE_URL, MIN_INTERVAL_FLOOR};
use tabletop_pipeline::{MatchThresholds, ResolverOptions};

use crate::error::CliError;

/// Settings file looked for in the working directory.
pub(crate) const LOCAL_SETTINGS: &str = "tabletop.toml";
/// Environment variable that overrides `remote.api_token`.
pub(crate) const TOKEN_ENV: &str = "BGG_API_TOKEN";

/// Canonical path to the user settings file: `~/.config/tabletop/settings.toml`.
pub(crate) fn user_settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("tabletop").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub paths: PathSettings,
    pub matching: MatchingSettings,
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PathSettings {
    pub list: PathBuf,
    pub store: PathBuf,
    pub cache: PathBuf,
    pub images: PathBuf,
    pub rankings: Option<PathBuf>,
    pub collection: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            list: PathBuf::from("list.txt"),
            store: PathBuf::from("boardgame_ids.csv"),
            cache: PathBuf::from("boardgames_enriched.csv"),
            images: PathBuf::from("images"),
            rankings: None,
            collection: PathBuf::from("collection.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MatchingSettings {
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub low_threshold: f64,
    pub max_alternatives: usize,
    pub remote_search: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        let thresholds = MatchThresholds::default();
        let options = ResolverOptions::default();
        Self {
            high_threshold: thresholds.high,
            medium_threshold: thresholds.medium,
            low_threshold: thresholds.low,
            max_alternatives: options.max_alternatives,
            remote_search: options.remote_search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RemoteSettings {
    pub base_url: String,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: Option<String>,
    pub api_token: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval_ms: client.min_interval.as_millis() as u64,
            timeout_secs: client.timeout.as_secs(),
            max_retries: client.max_retries,
            user_agent: None,
            api_token: None,
        }
    }
}

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SettingsSource {
    Explicit(PathBuf),
    Local(PathBuf),
    User(PathBuf),
    Defaults,
}

impl SettingsSource {
    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Local(p) | Self::User(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Local(p) => write!(f, "{} (working directory)", p.display()),
            Self::User(p) => write!(f, "{} (user config)", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Pick the settings file to use.
pub(crate) fn locate(explicit: Option<&Path>) -> Result<SettingsSource, CliError> {
    locate_in(explicit, Path::new(LOCAL_SETTINGS), &user_settings_path())
}

fn locate_in(
    explicit: Option<&Path>,
    local: &Path,
    user: &Path,
) -> Result<SettingsSource, CliError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CliError::config(format!(
                "settings file {} does not exist",
                path.display()
            )));
        }
        return Ok(SettingsSource::Explicit(path.to_path_buf()));
    }
    if local.is_file() {
        return Ok(SettingsSource::Local(local.to_path_buf()));
    }
    if user.is_file() {
        return Ok(SettingsSource::User(user.to_path_buf()));
    }
    Ok(SettingsSource::Defaults)
}

/// Load, apply the environment override, and validate.
pub(crate) fn load(explicit: Option<&Path>) -> Result<(Settings, SettingsSource), CliError> {
    let source = locate(explicit)?;
    let mut settings = match source.path() {
        Some(path) => Settings::read(path)?,
        None => Settings::default(),
    };
    settings.apply_token(std::env::var(TOKEN_ENV).ok());
    settings.validate()?;
    log::debug!("Using settings from {source}");
    Ok((settings, source))
}

impl Settings {
    pub(crate) fn read(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    pub(crate) fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|source| CliError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A non-empty token from the environment beats the file.
    pub(crate) fn apply_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.remote.api_token = Some(token.trim().to_string());
        }
    }

    /// Check thresholds and raise a too-short call interval to the floor.
    pub(crate) fn validate(&mut self) -> Result<(), CliError> {
        if !self.thresholds().is_valid() {
            return Err(CliError::config(format!(
                "thresholds must satisfy 0 <= low ({}) <= medium ({}) <= high ({}) <= 1",
                self.matching.low_threshold,
                self.matching.medium_threshold,
                self.matching.high_threshold
            )));
        }
        let floor = MIN_INTERVAL_FLOOR.as_millis() as u64;
        if self.remote.min_interval_ms < floor {
            log::warn!(
                "remote.min_interval_ms {} is below {floor}; using {floor}",
                self.remote.min_interval_ms
            );
            self.remote.min_interval_ms = floor;
        }
        if self.remote.base_url.trim().is_empty() {
            return Err(CliError::config("remote.base_url is empty"));
        }
        Ok(())
    }

    pub(crate) fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            high: self.matching.high_threshold,
            medium: self.matching.medium_threshold,
            low: self.matching.low_threshold,
        }
    }

    pub(crate) fn resolver_options(&self, offline: bool) -> ResolverOptions {
        ResolverOptions {
            thresholds: self.thresholds(),
            max_alternatives: self.matching.max_alternatives,
            remote_search: self.matching.remote_search && !offline,
        }
    }

    pub(crate) fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.remote.base_url.clone(),
            min_interval: Duration::from_millis(self.remote.min_interval_ms),
            timeout: Duration::from_secs(self.remote.timeout_secs),
            max_retries: self.remote.max_retries,
            user_agent: self
                .remote
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            api_token: self.remote.api_token.clone(),
        }
    }

    pub(crate) fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::config(e.to_string()))
    }
}

/// Write the default settings to `path`, refusing to overwrite.
pub(crate) fn write_default(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::config(format!(
            "{} already exists; not overwriting",
            path.display()
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let text = Settings::default().to_toml()?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
