//! Configuration management for shieldgate

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::environment::EnvironmentOverrides;
use super::settings::GuardSettings;

/// Largest UTC offset accepted for the site timezone (±14h)
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Main configuration structure
///
/// The administrator settings are flattened into the top level of the document so the
/// same file can be served to [`crate::store::FileSettingsStore`] as a per-request snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Persisted cycle state location
    pub state: StateConfig,
    /// Administrator settings
    #[serde(flatten)]
    pub settings: GuardSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json, text)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(GuardError::config(format!(
                    "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.level
                )))
            }
        }

        match self.format.as_str() {
            "json" | "text" => Ok(()),
            _ => Err(GuardError::config(format!(
                "Invalid log format '{}'. Must be one of: json, text",
                self.format
            ))),
        }
    }
}

/// Where `last_reset_epoch` is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub file: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./shieldgate_state.json"),
        }
    }
}

impl GuardConfig {
    /// Load .env files from `dir` in order of precedence
    fn load_env_files(dir: &Path) {
        let env = std::env::var("SHIELDGATE_ENV").unwrap_or_else(|_| "development".to_string());

        let env_specific_file = format!(".env.{}", env);
        let env_files = [".env", env_specific_file.as_str(), ".env.local"];

        for env_file in env_files {
            let env_path = dir.join(env_file);
            match dotenvy::from_path(&env_path) {
                Ok(_) => {
                    tracing::info!("Loaded environment variables from {}", env_path.display());
                }
                Err(e) if e.not_found() => {
                    tracing::debug!("No {} file found, skipping", env_path.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", env_path.display(), e);
                }
            }
        }

        tracing::debug!("Environment: {}", env);
    }

    /// Load configuration from file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_env_files(Path::new(""));
        let overrides = EnvironmentOverrides::load()?;
        Self::load_with(path.as_ref(), &overrides)
    }

    /// Load the `.env` files, then pick the config file (`SHIELDGATE_CONFIG_PATH` wins
    /// over `default_path`) and load it. Returns the effective path with the config.
    pub fn discover<P: AsRef<Path>>(default_path: P) -> Result<(PathBuf, Self)> {
        Self::discover_in(Path::new(""), default_path)
    }

    /// [`GuardConfig::discover`] with the `.env` files read from `env_dir`
    pub fn discover_in<P: AsRef<Path>>(env_dir: &Path, default_path: P) -> Result<(PathBuf, Self)> {
        Self::load_env_files(env_dir);
        let overrides = EnvironmentOverrides::load()?;
        let path = overrides.get_config_path(default_path.as_ref());
        let config = Self::load_with(&path, &overrides)?;
        Ok((path, config))
    }

    fn load_with(path: &Path, overrides: &EnvironmentOverrides) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        // precedence: .env < file < env
        overrides.apply_to_config(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without environment overrides or validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            GuardError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_yaml::from_str(&content)
            .map_err(|e| GuardError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate load-time configuration. Per-request settings faults are never
    /// rejected here; they fall back to defaults where they are consumed.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;

        let offset = self.settings.site.utc_offset_minutes;
        if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&offset) {
            return Err(GuardError::config(format!(
                "site.utc_offset_minutes must be within ±{} (got {})",
                MAX_UTC_OFFSET_MINUTES, offset
            )));
        }

        url::Url::parse(&self.settings.site.url).map_err(|e| {
            GuardError::config(format!("Invalid site.url '{}': {}", self.settings.site.url, e))
        })?;

        if self.state.file.as_os_str().is_empty() {
            return Err(GuardError::config("state.file cannot be empty"));
        }

        Ok(())
    }
}
