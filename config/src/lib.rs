//! Configuration loading for deferral.
//!
//! Settings come from `~/.deferral/config.toml` and can be overridden by
//! environment variables. Everything is optional; a missing or broken file
//! falls back to defaults with a logged warning.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt, fs, io};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Overrides `[demo] delay_ms`.
pub const DELAY_ENV_VAR: &str = "DEFERRAL_DELAY_MS";

pub const DEFAULT_DELAY_MS: u64 = 2_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: TomlError,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct DeferralConfig {
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DemoConfig {
    pub delay_ms: Option<u64>,
    pub styles: Option<Vec<String>>,
}

impl DeferralConfig {
    /// Load the default config file, if there is a usable one.
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".deferral").join("config.toml"))
}

/// Which consumer the demo drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerStyle {
    Callback,
    Sequential,
}

impl ConsumerStyle {
    pub const ALL: [ConsumerStyle; 2] = [ConsumerStyle::Callback, ConsumerStyle::Sequential];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConsumerStyle::Callback => "callback",
            ConsumerStyle::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ConsumerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown consumer style '{0}'; expected callback or sequential")]
pub struct UnknownStyle(String);

impl FromStr for ConsumerStyle {
    type Err = UnknownStyle;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "callback" | "promise" => Ok(ConsumerStyle::Callback),
            "sequential" | "async" => Ok(ConsumerStyle::Sequential),
            _ => Err(UnknownStyle(raw.to_string())),
        }
    }
}

/// Effective demo settings after defaults and overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    pub delay: Duration,
    pub styles: Vec<ConsumerStyle>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            styles: ConsumerStyle::ALL.to_vec(),
        }
    }
}

impl DemoSettings {
    /// Resolve from the default config file and the process environment.
    #[must_use]
    pub fn load() -> Self {
        let config = DeferralConfig::load();
        let delay_override = env::var(DELAY_ENV_VAR).ok();
        Self::resolve(config.as_ref(), delay_override.as_deref())
    }

    /// Combine an optional config with an optional raw delay override.
    #[must_use]
    pub fn resolve(config: Option<&DeferralConfig>, delay_override: Option<&str>) -> Self {
        let mut settings = Self::default();
        let demo = config.and_then(|cfg| cfg.demo.as_ref());

        if let Some(delay_ms) = demo.and_then(|demo| demo.delay_ms) {
            settings.delay = Duration::from_millis(delay_ms);
        }

        if let Some(raw) = delay_override {
            match raw.trim().parse::<u64>() {
                Ok(delay_ms) => settings.delay = Duration::from_millis(delay_ms),
                Err(e) => tracing::warn!("Ignoring {DELAY_ENV_VAR}={raw:?}: {e}"),
            }
        }

        if let Some(raw_styles) = demo.and_then(|demo| demo.styles.as_ref()) {
            let mut styles = Vec::new();
            for raw in raw_styles {
                match raw.parse::<ConsumerStyle>() {
                    Ok(style) if !styles.contains(&style) => styles.push(style),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("{e}"),
                }
            }
            settings.styles = styles;
        }

        settings
    }

    #[must_use]
    pub fn runs(&self, style: ConsumerStyle) -> bool {
        self.styles.contains(&style)
    }
}
