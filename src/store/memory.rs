//! In-process settings store

use std::sync::{Mutex, RwLock};

use super::SettingsStore;
use crate::config::GuardSettings;
use crate::error::{GuardError, Result};

/// Settings and cycle marker held in memory, for embedding hosts and tests
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<GuardSettings>,
    last_reset_epoch: Mutex<Option<i64>>,
}

impl MemorySettingsStore {
    pub fn new(settings: GuardSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            last_reset_epoch: Mutex::new(None),
        }
    }

    pub fn with_last_reset_epoch(self, epoch: i64) -> Self {
        if let Ok(mut last) = self.last_reset_epoch.lock() {
            *last = Some(epoch);
        }
        self
    }

    /// Change the stored settings; later snapshots see the change
    pub fn update_settings<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut GuardSettings),
    {
        let mut settings = self
            .settings
            .write()
            .map_err(|e| GuardError::store(format!("Settings lock poisoned: {}", e)))?;
        update(&mut settings);
        Ok(())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load_settings(&self) -> Result<GuardSettings> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .map_err(|e| GuardError::store(format!("Settings lock poisoned: {}", e)))
    }

    fn last_reset_epoch(&self) -> Result<Option<i64>> {
        self.last_reset_epoch
            .lock()
            .map(|last| *last)
            .map_err(|e| GuardError::store(format!("Cycle state lock poisoned: {}", e)))
    }

    fn set_last_reset_epoch(&self, epoch: i64) -> Result<()> {
        let mut last = self
            .last_reset_epoch
            .lock()
            .map_err(|e| GuardError::store(format!("Cycle state lock poisoned: {}", e)))?;
        *last = Some(epoch);
        Ok(())
    }
}
