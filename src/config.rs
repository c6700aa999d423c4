//! Output configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults, an optional
//! TOML file (`config` feature), then environment variables:
//!
//! - `NINJA_STATUS`: progress template (see [`crate::format`])
//! - `STATUSLINE_QUIET`: drop per-action lines and failing commands from output
//! - `STATUSLINE_DUMB`: never use the smart status line

use crate::error::{Result, StatusError};
use crate::format::DEFAULT_STATUS_FORMAT;

pub const STATUS_FORMAT_VAR: &str = "NINJA_STATUS";
pub const QUIET_VAR: &str = "STATUSLINE_QUIET";
pub const FORCE_DUMB_VAR: &str = "STATUSLINE_DUMB";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct StatusConfig {
    /// Progress template placed in front of every action description
    pub status_format: String,
    /// Suppress per-action progress lines and failing command lines
    pub quiet: bool,
    /// Use line-oriented output even on an interactive terminal
    pub force_dumb: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            status_format: DEFAULT_STATUS_FORMAT.to_string(),
            quiet: false,
            force_dumb: false,
        }
    }
}

impl StatusConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Override fields from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(format) = lookup(STATUS_FORMAT_VAR) {
            if !format.is_empty() {
                self.status_format = format;
            }
        }
        if let Some(value) = lookup(QUIET_VAR) {
            self.quiet = parse_flag(QUIET_VAR, &value)?;
        }
        if let Some(value) = lookup(FORCE_DUMB_VAR) {
            self.force_dumb = parse_flag(FORCE_DUMB_VAR, &value)?;
        }
        Ok(self)
    }
}

#[cfg(feature = "config")]
impl StatusConfig {
    /// Parse a TOML configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| StatusError::io(format!("cannot read {}", path.display()), err))?;
        toml::from_str(&text)
            .map_err(|err| StatusError::config(format!("{}: {}", path.display(), err)))
    }

    /// Load `<config dir>/statusline/config.toml` when it exists, defaults otherwise.
    pub fn load_default() -> Result<Self> {
        match dirs::config_dir().map(|dir| dir.join("statusline").join("config.toml")) {
            Some(path) if path.is_file() => {
                log::debug!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(StatusError::config(format!(
            "{} must be a boolean, got `{}`",
            name, other
        ))),
    }
}
