//! Settings and cycle-state storage
//!
//! Settings are external mutable state: every request reads a fresh snapshot and
//! nothing is cached between requests. The only value this layer writes back is the
//! cycle marker `last_reset_epoch`.

mod file;
mod memory;

pub use file::{CycleState, FileSettingsStore};
pub use memory::MemorySettingsStore;

use crate::config::GuardSettings;
use crate::error::Result;

/// Configuration/state collaborator
pub trait SettingsStore {
    /// Read a fresh settings snapshot
    fn load_settings(&self) -> Result<GuardSettings>;

    /// Epoch seconds of the last cycle reset, if one was ever recorded
    fn last_reset_epoch(&self) -> Result<Option<i64>>;

    fn set_last_reset_epoch(&self, epoch: i64) -> Result<()>;
}
