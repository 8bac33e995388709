//! Environment variable integration for shieldgate configuration

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Environment variable names used by shieldgate
pub struct EnvVars;

impl EnvVars {
    pub const CONFIG_PATH: &'static str = "SHIELDGATE_CONFIG_PATH";
    pub const LOG_LEVEL: &'static str = "SHIELDGATE_LOG_LEVEL";
    pub const LOG_FORMAT: &'static str = "SHIELDGATE_LOG_FORMAT";
    pub const SITE_URL: &'static str = "SHIELDGATE_SITE_URL";
    pub const UTC_OFFSET_MINUTES: &'static str = "SHIELDGATE_UTC_OFFSET_MINUTES";
    pub const STATE_FILE: &'static str = "SHIELDGATE_STATE_FILE";
}

/// Environment configuration overrides
#[derive(Debug, Clone, Default)]
pub struct EnvironmentOverrides {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub site_url: Option<String>,
    pub utc_offset_minutes: Option<i32>,
    pub state_file: Option<PathBuf>,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl EnvironmentOverrides {
    /// Load environment variable overrides
    pub fn load() -> Result<Self> {
        let mut overrides = EnvironmentOverrides::default();

        if let Some(path) = non_empty_var(EnvVars::CONFIG_PATH) {
            debug!("Environment override: {}={}", EnvVars::CONFIG_PATH, path);
            overrides.config_path = Some(PathBuf::from(path));
        }

        if let Some(level) = non_empty_var(EnvVars::LOG_LEVEL) {
            debug!("Environment override: {}={}", EnvVars::LOG_LEVEL, level);
            overrides.log_level = Some(level);
        }

        if let Some(format) = non_empty_var(EnvVars::LOG_FORMAT) {
            debug!("Environment override: {}={}", EnvVars::LOG_FORMAT, format);
            overrides.log_format = Some(format);
        }

        if let Some(url) = non_empty_var(EnvVars::SITE_URL) {
            debug!("Environment override: {}={}", EnvVars::SITE_URL, url);
            overrides.site_url = Some(url);
        }

        if let Some(offset_str) = non_empty_var(EnvVars::UTC_OFFSET_MINUTES) {
            match offset_str.trim().parse::<i32>() {
                Ok(offset) => {
                    debug!("Environment override: {}={}", EnvVars::UTC_OFFSET_MINUTES, offset);
                    overrides.utc_offset_minutes = Some(offset);
                }
                Err(e) => {
                    warn!("Invalid {}: {} ({})", EnvVars::UTC_OFFSET_MINUTES, offset_str, e);
                    return Err(GuardError::config(format!(
                        "Invalid {}: {} (expected whole minutes east of UTC)",
                        EnvVars::UTC_OFFSET_MINUTES,
                        offset_str
                    )));
                }
            }
        }

        if let Some(path) = non_empty_var(EnvVars::STATE_FILE) {
            debug!("Environment override: {}={}", EnvVars::STATE_FILE, path);
            overrides.state_file = Some(PathBuf::from(path));
        }

        Ok(overrides)
    }

    /// Apply environment overrides to a config
    pub fn apply_to_config(&self, config: &mut GuardConfig) {
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }

        if let Some(ref format) = self.log_format {
            config.logging.format = format.clone();
        }

        if let Some(ref url) = self.site_url {
            if &config.settings.site.url != url {
                debug!(
                    "Environment override: site.url changed from {} to {}",
                    config.settings.site.url, url
                );
            }
            config.settings.site.url = url.clone();
        }

        if let Some(offset) = self.utc_offset_minutes {
            config.settings.site.utc_offset_minutes = offset;
        }

        if let Some(ref path) = self.state_file {
            config.state.file = path.clone();
        }
    }

    /// Get the effective config file path (with environment override)
    pub fn get_config_path(&self, default_path: &std::path::Path) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| default_path.to_path_buf())
    }

    /// Check if any environment overrides are active
    pub fn has_overrides(&self) -> bool {
        self.config_path.is_some()
            || self.log_level.is_some()
            || self.log_format.is_some()
            || self.site_url.is_some()
            || self.utc_offset_minutes.is_some()
            || self.state_file.is_some()
    }
}
