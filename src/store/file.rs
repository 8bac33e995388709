//! File-backed settings store
//!
//! The YAML settings file is re-read on every request, with the same environment
//! overrides `GuardConfig::load` applies. The cycle marker lives in a separate JSON
//! state file so the administrator's file is never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::SettingsStore;
use crate::config::{EnvironmentOverrides, GuardConfig, GuardSettings};
use crate::error::{GuardError, Result};

/// Persisted cycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    /// Epoch seconds of the midnight at which the last reset happened
    pub last_reset_epoch: Option<i64>,
    /// When the state was last written
    pub updated_at: Option<DateTime<Utc>>,
}

/// Settings from a YAML file, cycle state in a JSON file
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    settings_path: PathBuf,
    state_path: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(settings_path: P, state_path: Q) -> Self {
        Self {
            settings_path: settings_path.into(),
            state_path: state_path.into(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Load the cycle state file; a missing file is an empty state
    pub fn load_state(&self) -> Result<CycleState> {
        if !self.state_path.exists() {
            debug!("No cycle state file at {:?}", self.state_path);
            return Ok(CycleState::default());
        }

        let contents = fs::read_to_string(&self.state_path)?;
        serde_json::from_str(&contents).map_err(|e| {
            GuardError::store(format!(
                "Corrupt cycle state file {}: {}",
                self.state_path.display(),
                e
            ))
        })
    }

    /// Read the settings file and apply `overrides` on top of it
    pub fn load_settings_with(&self, overrides: &EnvironmentOverrides) -> Result<GuardSettings> {
        let mut config = if self.settings_path.exists() {
            GuardConfig::from_file(&self.settings_path)?
        } else {
            warn!(
                "Settings file {} not found, using defaults",
                self.settings_path.display()
            );
            GuardConfig::default()
        };

        overrides.apply_to_config(&mut config);
        Ok(config.settings)
    }

    fn save_state(&self, state: &CycleState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.state_path, contents)?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn load_settings(&self) -> Result<GuardSettings> {
        self.load_settings_with(&EnvironmentOverrides::load()?)
    }

    fn last_reset_epoch(&self) -> Result<Option<i64>> {
        Ok(self.load_state()?.last_reset_epoch)
    }

    fn set_last_reset_epoch(&self, epoch: i64) -> Result<()> {
        self.save_state(&CycleState {
            last_reset_epoch: Some(epoch),
            updated_at: Some(Utc::now()),
        })
    }
}
