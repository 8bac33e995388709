//! Guard Test Utilities
//!
//! Shared fixtures for the integration tests: settings builders, fixed instants and
//! a one-call helper that runs a request through the whole pipeline.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use secrecy::Secret;
use std::net::IpAddr;

use shieldgate::engine::{DryRunEngine, EngineCall};
use shieldgate::security::InitReport;
use shieldgate::{GuardOutcome, GuardSettings, Guardian, IncomingRequest, SettingsStore};

/// Test utilities for guard pipeline testing
pub struct GuardTestUtils;

impl GuardTestUtils {
    /// Fixed instant used where the exact time does not matter
    pub fn noon() -> DateTime<Utc> {
        Self::at(2024, 3, 1, 12, 0, 0)
    }

    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
    }

    pub fn epoch(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    pub fn client() -> IpAddr {
        "203.0.113.7".parse().unwrap()
    }

    /// Settings with the login page locked down behind `passcode`
    pub fn login_lockdown(passcode: &str) -> GuardSettings {
        let mut settings = GuardSettings::default();
        settings.ip_login.deny_all = true;
        settings.ip_login.deny_all_passcode = Secret::new(passcode.to_string());
        settings
    }

    pub fn request(uri: &str) -> IncomingRequest {
        IncomingRequest::new(uri).with_peer_addr(Self::client())
    }

    /// Run `init` then `run` for one request against a fresh dry-run engine
    pub fn evaluate<S: SettingsStore>(
        store: &S,
        request: IncomingRequest,
        now: DateTime<Utc>,
    ) -> PipelineRun {
        Self::evaluate_with(store, request, now, DryRunEngine::new())
    }

    pub fn evaluate_with<S: SettingsStore>(
        store: &S,
        request: IncomingRequest,
        now: DateTime<Utc>,
        mut engine: DryRunEngine,
    ) -> PipelineRun {
        let guardian = Guardian::from_store(store, request).unwrap();
        let report = guardian.init(&mut engine, store, now).unwrap();
        let outcome = guardian.run(&mut engine).unwrap();
        PipelineRun {
            report,
            outcome,
            engine,
        }
    }
}

/// Everything one pipeline run produced
pub struct PipelineRun {
    pub report: InitReport,
    pub outcome: GuardOutcome,
    pub engine: DryRunEngine,
}

impl PipelineRun {
    pub fn operations(&self) -> Vec<&'static str> {
        self.engine.calls().iter().map(EngineCall::operation).collect()
    }

    pub fn called(&self, operation: &str) -> bool {
        !self.engine.calls_named(operation).is_empty()
    }
}
