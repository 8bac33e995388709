//! Daily data-cycle reset
//!
//! There is no background scheduler: the check rides on ordinary request traffic.
//! The first request more than 24 hours after the last recorded reset moves the
//! marker to the start of the current calendar day and wipes the engine state inline.
//! On an idle site the wipe can therefore happen long after midnight.
//!
//! The read-then-write of the marker is not locked. Concurrent requests crossing the
//! boundary may each reset, so the engine wipe must be idempotent (at-least-once).

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GuardSettings;
use crate::engine::FirewallEngine;
use crate::error::Result;
use crate::store::SettingsStore;

/// Length of one data cycle
pub const CYCLE_LENGTH_SECS: i64 = 86_400;

/// Decision of the cycle gate for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleDecision {
    /// Wipe the engine state now
    pub reset: bool,
    /// New `last_reset_epoch` to persist, if it changed
    pub persist: Option<i64>,
}

impl CycleDecision {
    const IDLE: CycleDecision = CycleDecision {
        reset: false,
        persist: None,
    };
}

/// Epoch seconds of the most recent midnight at `offset`
pub fn start_of_day(now: DateTime<Utc>, offset: FixedOffset) -> i64 {
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    local_midnight.and_utc().timestamp() - i64::from(offset.local_minus_utc())
}

/// Lazy daily reset gate
#[derive(Debug, Clone, Copy)]
pub struct CycleResetGate {
    enabled: bool,
    offset: FixedOffset,
}

impl CycleResetGate {
    pub fn new(enabled: bool, offset: FixedOffset) -> Self {
        Self { enabled, offset }
    }

    pub fn from_settings(settings: &GuardSettings) -> Self {
        Self::new(settings.daemon.reset_data_cycle, settings.site.utc_offset())
    }

    /// Pure decision for a request at `now` given the persisted marker
    pub fn evaluate(&self, last_reset_epoch: Option<i64>, now: DateTime<Utc>) -> CycleDecision {
        if !self.enabled {
            return CycleDecision::IDLE;
        }

        match last_reset_epoch {
            None => CycleDecision {
                // first sighting anchors the cycle without wiping anything
                reset: false,
                persist: Some(start_of_day(now, self.offset)),
            },
            Some(last) if now.timestamp().saturating_sub(last) > CYCLE_LENGTH_SECS => CycleDecision {
                reset: true,
                persist: Some(start_of_day(now, self.offset)),
            },
            Some(_) => CycleDecision::IDLE,
        }
    }

    /// Read the marker, persist any update, then wipe the engine if a reset is due
    pub fn run<S, E>(&self, store: &S, engine: &mut E, now: DateTime<Utc>) -> Result<CycleDecision>
    where
        S: SettingsStore + ?Sized,
        E: FirewallEngine + ?Sized,
    {
        if !self.enabled {
            return Ok(CycleDecision::IDLE);
        }

        let last = store.last_reset_epoch()?;
        let decision = self.evaluate(last, now);

        if let Some(epoch) = decision.persist {
            store.set_last_reset_epoch(epoch)?;
            debug!("Cycle marker moved from {:?} to {}", last, epoch);
        }

        if decision.reset {
            info!(
                "New data cycle started (previous reset at {:?}), wiping engine state",
                last
            );
            engine.rebuild()?;
        }

        Ok(decision)
    }
}
