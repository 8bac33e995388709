//! Per-request guard pipeline
//!
//! A `Guardian` binds one settings snapshot to one request. `init` configures the
//! engine for the request; `run` asks the engine for its verdict. Both steps are
//! synchronous and propagate every collaborator failure to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;
use tracing::{debug, info, warn};

use crate::config::GuardSettings;
use crate::engine::FirewallEngine;
use crate::error::Result;
use crate::request::IncomingRequest;
use crate::store::SettingsStore;

use super::client_ip::resolve_client_ip;
use super::components::{apply_captcha, apply_components};
use super::context::RequestContext;
use super::cycle::{CycleDecision, CycleResetGate};
use super::exclusion::{ExclusionMatcher, ExclusionRule};
use super::filters::{session_limit, FilterComposition};
use super::lockdown::BypassCookie;
use super::policy::{ContextPolicyResolver, ResolvedPolicy};
use super::protection::{apply_http_auth, apply_xss_protection};

/// HTTP status the engine's block page is rendered with
pub const BLOCK_PAGE_STATUS: u16 = 200;

/// What happened to the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardOutcome {
    /// Matched an exclusion rule; the guard did nothing
    Excluded,
    Allowed,
    /// Blocked by the engine, but the client solved the CAPTCHA and was unbanned
    Unbanned,
    /// The engine renders its block page with `status`
    Blocked { status: u16 },
}

impl GuardOutcome {
    /// Whether the host should continue rendering its own response
    pub fn proceeds(&self) -> bool {
        !matches!(self, GuardOutcome::Blocked { .. })
    }
}

/// Record of what `init` did
#[derive(Debug, Clone)]
pub struct InitReport {
    pub context: RequestContext,
    pub cycle: CycleDecision,
    /// Exclusion rule the request matched, if any
    pub excluded_by: Option<ExclusionRule>,
    pub client_ip: Option<IpAddr>,
    /// Resolved IP policy; absent for excluded requests
    pub policy: Option<ResolvedPolicy>,
}

impl InitReport {
    /// Cookie the host must set on the response, if the bypass gate issued one
    pub fn bypass_cookie(&self) -> Option<&BypassCookie> {
        self.policy
            .as_ref()
            .and_then(|policy| policy.bypass.as_ref())
            .and_then(|bypass| bypass.issue_cookie.as_ref())
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded_by.is_some()
    }
}

/// Guard for a single request
pub struct Guardian {
    settings: GuardSettings,
    request: IncomingRequest,
    context: RequestContext,
    excluded_by: Option<ExclusionRule>,
}

impl Guardian {
    pub fn new(settings: GuardSettings, request: IncomingRequest) -> Self {
        let context = RequestContext::classify(&request.uri);
        let install_dir = settings.site.install_dir();
        let excluded_by = ExclusionMatcher::from_settings(&settings.exclusion, &install_dir)
            .first_match(&request.uri)
            .cloned();

        Self {
            settings,
            request,
            context,
            excluded_by,
        }
    }

    /// Build a guard from a fresh settings snapshot
    pub fn from_store<S: SettingsStore + ?Sized>(store: &S, request: IncomingRequest) -> Result<Self> {
        Ok(Self::new(store.load_settings()?, request))
    }

    pub fn context(&self) -> RequestContext {
        self.context
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded_by.is_some()
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    pub fn request(&self) -> &IncomingRequest {
        &self.request
    }

    /// Configure the engine for this request.
    ///
    /// The cycle gate runs for every request, excluded or not. Everything after it is
    /// skipped for excluded requests.
    pub fn init<E, S>(&self, engine: &mut E, store: &S, now: DateTime<Utc>) -> Result<InitReport>
    where
        E: FirewallEngine + ?Sized,
        S: SettingsStore + ?Sized,
    {
        let cycle = CycleResetGate::from_settings(&self.settings).run(store, engine, now)?;

        if let Some(rule) = &self.excluded_by {
            debug!(
                "Request {} excluded by prefix '{}', skipping protection",
                self.request.uri, rule.prefix
            );
            return Ok(InitReport {
                context: self.context,
                cycle,
                excluded_by: self.excluded_by.clone(),
                client_ip: None,
                policy: None,
            });
        }

        let client_ip = resolve_client_ip(self.settings.daemon.ip_source, &self.request);
        match client_ip {
            Some(ip) => engine.set_client_ip(ip)?,
            None => warn!("No client address available for {}", self.request.uri),
        }

        FilterComposition::from_settings(&self.settings.filter).apply(engine)?;
        apply_components(&self.settings.component, engine)?;

        let policy = ContextPolicyResolver::new(&self.settings).resolve_and_apply(
            self.context,
            &self.request,
            now,
            engine,
        )?;

        apply_captcha(&self.settings.captcha, engine)?;

        if let Some(limit) = session_limit(&self.settings.daemon) {
            engine.limit_session(limit)?;
        }

        apply_http_auth(&self.settings.authentication, engine)?;
        apply_xss_protection(&self.settings.xss_protection, engine)?;

        Ok(InitReport {
            context: self.context,
            cycle,
            excluded_by: None,
            client_ip,
            policy: Some(policy),
        })
    }

    /// Ask the engine for its verdict. Excluded requests never reach the engine.
    pub fn run<E: FirewallEngine + ?Sized>(&self, engine: &mut E) -> Result<GuardOutcome> {
        if self.is_excluded() {
            return Ok(GuardOutcome::Excluded);
        }

        let verdict = engine.run()?;
        if verdict.is_allow() {
            return Ok(GuardOutcome::Allowed);
        }

        if engine.captcha_solved()? {
            info!("CAPTCHA solved after {:?} verdict, unbanning", verdict);
            engine.unban()?;
            return Ok(GuardOutcome::Unbanned);
        }

        info!("Blocked {} request with verdict {:?}", self.context, verdict);
        Ok(GuardOutcome::Blocked {
            status: BLOCK_PAGE_STATUS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DryRunEngine, EngineCall};
    use crate::store::MemorySettingsStore;
    use chrono::TimeZone;
    use secrecy::Secret;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn peer() -> IpAddr {
        "203.0.113.7".parse().unwrap()
    }

    #[test]
    fn test_excluded_request_skips_everything() {
        let settings = GuardSettings::default();
        let guardian = Guardian::new(settings, IncomingRequest::new("/wp-json/wp/v2/posts").with_peer_addr(peer()));
        let store = MemorySettingsStore::default();
        let mut engine = DryRunEngine::new();

        let report = guardian.init(&mut engine, &store, now()).unwrap();
        assert!(report.is_excluded());
        assert!(report.policy.is_none());
        assert!(engine.calls().is_empty());

        assert_eq!(guardian.run(&mut engine).unwrap(), GuardOutcome::Excluded);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_init_order() {
        let mut settings = GuardSettings::default();
        settings.filter.enable_filter_frequency = true;
        settings.ip_global.deny_list = "10.0.0.1".to_string();
        settings.daemon.enable_online_session_limit = true;

        let guardian = Guardian::new(settings, IncomingRequest::new("/about/").with_peer_addr(peer()));
        let mut engine = DryRunEngine::new();
        guardian
            .init(&mut engine, &MemorySettingsStore::default(), now())
            .unwrap();

        let ops: Vec<&str> = engine.calls().iter().map(EngineCall::operation).collect();
        assert_eq!(
            ops,
            vec![
                "set_client_ip",
                "set_quota",
                "set_filters",
                "enable_component",
                "enable_component",
                "set_denied_list",
                "limit_session",
            ]
        );
    }

    #[test]
    fn test_http_auth_and_xss_come_last() {
        let mut settings = GuardSettings::default();
        settings.daemon.enable_online_session_limit = true;
        settings.authentication.protected_paths = vec![crate::config::AuthRule {
            url: "/wp-admin/".to_string(),
            user: "ops".to_string(),
            pass: Secret::new("hash".to_string()),
        }];
        settings.xss_protection.post = true;

        let guardian = Guardian::new(settings, IncomingRequest::new("/about/").with_peer_addr(peer()));
        let mut engine = DryRunEngine::new();
        guardian
            .init(&mut engine, &MemorySettingsStore::default(), now())
            .unwrap();

        let ops: Vec<&str> = engine.calls().iter().map(EngineCall::operation).collect();
        assert_eq!(
            &ops[ops.len() - 3..],
            &["limit_session", "set_http_auth", "set_xss_protection"]
        );
    }

    #[test]
    fn test_excluded_request_skips_xss_protection() {
        let mut settings = GuardSettings::default();
        settings.xss_protection.get = true;

        let guardian = Guardian::new(settings, IncomingRequest::new("/wp-json/wp/v2/posts"));
        let mut engine = DryRunEngine::new();
        guardian
            .init(&mut engine, &MemorySettingsStore::default(), now())
            .unwrap();
        assert!(engine.calls_named("set_xss_protection").is_empty());
    }

    #[test]
    fn test_blocked_and_unbanned() {
        let mut settings = GuardSettings::default();
        settings.ip_global.deny_list = "203.0.113.0/24".to_string();
        let request = IncomingRequest::new("/").with_peer_addr(peer());

        let guardian = Guardian::new(settings.clone(), request.clone());
        let mut engine = DryRunEngine::new();
        guardian.init(&mut engine, &MemorySettingsStore::default(), now()).unwrap();
        assert_eq!(
            guardian.run(&mut engine).unwrap(),
            GuardOutcome::Blocked { status: 200 }
        );

        let guardian = Guardian::new(settings, request);
        let mut engine = DryRunEngine::new().with_captcha_solved(true);
        guardian.init(&mut engine, &MemorySettingsStore::default(), now()).unwrap();
        assert_eq!(guardian.run(&mut engine).unwrap(), GuardOutcome::Unbanned);
        assert_eq!(engine.calls_named("unban").len(), 1);
    }

    #[test]
    fn test_bypass_cookie_reported() {
        let mut settings = GuardSettings::default();
        settings.ip_login.deny_all = true;
        settings.ip_login.deny_all_passcode = Secret::new("X7k".to_string());

        let guardian = Guardian::new(
            settings,
            IncomingRequest::new("/wp-login.php?X7k").with_peer_addr(peer()),
        );
        let mut engine = DryRunEngine::new();
        let report = guardian
            .init(&mut engine, &MemorySettingsStore::default(), now())
            .unwrap();

        assert_eq!(report.context, RequestContext::Login);
        assert!(report.bypass_cookie().is_some());
        assert!(!engine.is_deny_all());
        assert_eq!(guardian.run(&mut engine).unwrap(), GuardOutcome::Allowed);
    }

    #[test]
    fn test_outcome_proceeds() {
        assert!(GuardOutcome::Excluded.proceeds());
        assert!(GuardOutcome::Allowed.proceeds());
        assert!(GuardOutcome::Unbanned.proceeds());
        assert!(!GuardOutcome::Blocked { status: 200 }.proceeds());
    }
}
