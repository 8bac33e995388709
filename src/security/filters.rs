//! Filter capability, quota and session-limit composition

use tracing::warn;

use crate::config::{DaemonSettings, FilterSettings};
use crate::engine::{FilterCapabilities, FirewallEngine, SessionLimit, TimeUnitQuota};
use crate::error::Result;

/// Parse a non-negative integer setting, falling back to `default` when the text is
/// missing or not a whole number.
pub fn parse_quota(text: Option<&str>, default: u32, setting: &str) -> u32 {
    let Some(raw) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return default;
    };

    match raw.parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid value '{}' for {}, using default {}", raw, setting, default);
            default
        }
    }
}

/// Capability flags and per-time-unit quotas handed to the engine's filter subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterComposition {
    pub capabilities: FilterCapabilities,
    pub quota: TimeUnitQuota,
}

impl FilterComposition {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        let defaults = TimeUnitQuota::default();

        Self {
            capabilities: FilterCapabilities {
                session: settings.enable_filter_session,
                cookie: settings.enable_filter_cookie,
                referer: settings.enable_filter_referer,
                frequency: settings.enable_filter_frequency,
            },
            quota: TimeUnitQuota {
                second: parse_quota(settings.time_unit_quota_s.as_deref(), defaults.second, "time_unit_quota_s"),
                minute: parse_quota(settings.time_unit_quota_m.as_deref(), defaults.minute, "time_unit_quota_m"),
                hour: parse_quota(settings.time_unit_quota_h.as_deref(), defaults.hour, "time_unit_quota_h"),
                day: parse_quota(settings.time_unit_quota_d.as_deref(), defaults.day, "time_unit_quota_d"),
            },
        }
    }

    /// The quota only matters to the frequency filter, so it is handed over only when
    /// that filter is on.
    pub fn apply<E: FirewallEngine + ?Sized>(&self, engine: &mut E) -> Result<()> {
        if self.capabilities.frequency {
            engine.set_quota(self.quota)?;
        }
        engine.set_filters(self.capabilities)
    }
}

/// Online session limit, if enabled. Zero counts or periods fall back to defaults.
pub fn session_limit(settings: &DaemonSettings) -> Option<SessionLimit> {
    if !settings.enable_online_session_limit {
        return None;
    }

    let defaults = SessionLimit::default();
    let count = match parse_quota(settings.session_limit_count.as_deref(), defaults.count, "session_limit_count") {
        0 => defaults.count,
        n => n,
    };
    let period_secs = match parse_quota(settings.session_limit_period.as_deref(), 0, "session_limit_period") {
        0 => defaults.period_secs,
        minutes => u64::from(minutes) * 60,
    };

    Some(SessionLimit { count, period_secs })
}
