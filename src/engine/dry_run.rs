//! Recording engine used for dry runs and tests
//!
//! Records every call in order and simulates only the IP component when asked for
//! a verdict: an allow-listed client passes, otherwise deny-all or a deny-list hit
//! blocks, otherwise the request passes.

use ipnetwork::IpNetwork;
use serde::Serialize;
use std::net::IpAddr;
use tracing::debug;

use super::types::{
    CaptchaSpec, ComponentSpec, EngineVerdict, FilterCapabilities, SessionLimit, TimeUnitQuota,
    XssSpec,
};
use super::FirewallEngine;
use crate::config::AuthRule;
use crate::error::{GuardError, Result};
use crate::security::ip_list::IpPatternList;

/// One recorded engine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EngineCall {
    SetClientIp { ip: IpAddr },
    SetAllowedList { list: Vec<String> },
    SetDeniedList { list: Vec<String> },
    DenyAll,
    SetFilters { filters: FilterCapabilities },
    SetQuota { quota: TimeUnitQuota },
    LimitSession { limit: SessionLimit },
    EnableComponent { component: ComponentSpec },
    AddCaptcha { kind: &'static str },
    /// Protected path prefixes; credentials are not recorded
    SetHttpAuth { paths: Vec<String> },
    SetXssProtection { xss: XssSpec },
    Rebuild,
    Run { verdict: EngineVerdict },
    CaptchaSolved { solved: bool },
    Unban,
}

impl EngineCall {
    /// Operation name, matching the names used in engine errors
    pub fn operation(&self) -> &'static str {
        match self {
            EngineCall::SetClientIp { .. } => "set_client_ip",
            EngineCall::SetAllowedList { .. } => "set_allowed_list",
            EngineCall::SetDeniedList { .. } => "set_denied_list",
            EngineCall::DenyAll => "deny_all",
            EngineCall::SetFilters { .. } => "set_filters",
            EngineCall::SetQuota { .. } => "set_quota",
            EngineCall::LimitSession { .. } => "limit_session",
            EngineCall::EnableComponent { .. } => "enable_component",
            EngineCall::AddCaptcha { .. } => "add_captcha",
            EngineCall::SetHttpAuth { .. } => "set_http_auth",
            EngineCall::SetXssProtection { .. } => "set_xss_protection",
            EngineCall::Rebuild => "rebuild",
            EngineCall::Run { .. } => "run",
            EngineCall::CaptchaSolved { .. } => "captcha_solved",
            EngineCall::Unban => "unban",
        }
    }
}

/// In-process engine that records calls instead of protecting anything
#[derive(Debug, Default)]
pub struct DryRunEngine {
    calls: Vec<EngineCall>,
    client_ip: Option<IpAddr>,
    allowed: IpPatternList,
    denied: IpPatternList,
    deny_all: bool,
    captcha_solved: bool,
    fail_operation: Option<&'static str>,
}

fn to_strings(list: &[IpNetwork]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

impl DryRunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a solved CAPTCHA for the current request
    pub fn with_captcha_solved(mut self, solved: bool) -> Self {
        self.captcha_solved = solved;
        self
    }

    /// Make the named operation fail with an engine error
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_operation = Some(operation);
        self
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Calls of one operation, in order
    pub fn calls_named(&self, operation: &str) -> Vec<&EngineCall> {
        self.calls
            .iter()
            .filter(|call| call.operation() == operation)
            .collect()
    }

    pub fn allowed_list(&self) -> &IpPatternList {
        &self.allowed
    }

    pub fn denied_list(&self) -> &IpPatternList {
        &self.denied
    }

    pub fn is_deny_all(&self) -> bool {
        self.deny_all
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    fn record(&mut self, call: EngineCall) -> Result<()> {
        let operation = call.operation();
        if self.fail_operation == Some(operation) {
            return Err(GuardError::engine(operation, "injected failure"));
        }
        debug!("Dry-run engine call: {:?}", call);
        self.calls.push(call);
        Ok(())
    }

    fn simulate(&self) -> EngineVerdict {
        match self.client_ip {
            Some(ip) if self.allowed.contains(ip) => EngineVerdict::Allow,
            _ if self.deny_all => EngineVerdict::Deny,
            Some(ip) if self.denied.contains(ip) => EngineVerdict::Deny,
            _ => EngineVerdict::Allow,
        }
    }
}

impl FirewallEngine for DryRunEngine {
    fn set_client_ip(&mut self, ip: IpAddr) -> Result<()> {
        self.record(EngineCall::SetClientIp { ip })?;
        self.client_ip = Some(ip);
        Ok(())
    }

    fn set_allowed_list(&mut self, list: &[IpNetwork]) -> Result<()> {
        self.record(EngineCall::SetAllowedList { list: to_strings(list) })?;
        self.allowed = IpPatternList::from(list.to_vec());
        Ok(())
    }

    fn set_denied_list(&mut self, list: &[IpNetwork]) -> Result<()> {
        self.record(EngineCall::SetDeniedList { list: to_strings(list) })?;
        self.denied = IpPatternList::from(list.to_vec());
        Ok(())
    }

    fn deny_all(&mut self) -> Result<()> {
        self.record(EngineCall::DenyAll)?;
        self.deny_all = true;
        Ok(())
    }

    fn set_filters(&mut self, filters: FilterCapabilities) -> Result<()> {
        self.record(EngineCall::SetFilters { filters })
    }

    fn set_quota(&mut self, quota: TimeUnitQuota) -> Result<()> {
        self.record(EngineCall::SetQuota { quota })
    }

    fn limit_session(&mut self, limit: SessionLimit) -> Result<()> {
        self.record(EngineCall::LimitSession { limit })
    }

    fn enable_component(&mut self, component: ComponentSpec) -> Result<()> {
        self.record(EngineCall::EnableComponent { component })
    }

    fn add_captcha(&mut self, captcha: CaptchaSpec) -> Result<()> {
        self.record(EngineCall::AddCaptcha { kind: captcha.kind() })
    }

    fn set_http_auth(&mut self, rules: &[AuthRule]) -> Result<()> {
        let paths = rules.iter().map(|rule| rule.url.clone()).collect();
        self.record(EngineCall::SetHttpAuth { paths })
    }

    fn set_xss_protection(&mut self, xss: XssSpec) -> Result<()> {
        self.record(EngineCall::SetXssProtection { xss })
    }

    fn rebuild(&mut self) -> Result<()> {
        self.record(EngineCall::Rebuild)
    }

    fn run(&mut self) -> Result<EngineVerdict> {
        let verdict = self.simulate();
        self.record(EngineCall::Run { verdict })?;
        Ok(verdict)
    }

    fn captcha_solved(&mut self) -> Result<bool> {
        let solved = self.captcha_solved;
        self.record(EngineCall::CaptchaSolved { solved })?;
        Ok(solved)
    }

    fn unban(&mut self) -> Result<()> {
        self.record(EngineCall::Unban)
    }
}
