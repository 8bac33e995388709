//! Firewall engine collaborator
//!
//! The engine owns rate limiting, CAPTCHA verification, bot heuristics and
//! persistence. This layer only configures it and asks it for a verdict; it never
//! inspects engine state. Every operation may fail, and failures propagate to the
//! caller as a hard failure of the current request.

mod dry_run;
mod types;

pub use dry_run::{DryRunEngine, EngineCall};
pub use types::{
    CaptchaSpec, ComponentKind, ComponentSpec, EngineVerdict, FilterCapabilities, SessionLimit,
    TimeUnitQuota, XssSpec, XssTarget,
};

use ipnetwork::IpNetwork;
use std::net::IpAddr;

use crate::config::AuthRule;
use crate::error::Result;

/// Operations the guard pipeline calls on the firewall engine
pub trait FirewallEngine {
    /// Override the client address the engine evaluates
    fn set_client_ip(&mut self, ip: IpAddr) -> Result<()>;

    /// Replace the IP component's allow list
    fn set_allowed_list(&mut self, list: &[IpNetwork]) -> Result<()>;

    /// Replace the IP component's deny list
    fn set_denied_list(&mut self, list: &[IpNetwork]) -> Result<()>;

    /// Deny all traffic for the current request (allow-listed addresses excepted)
    fn deny_all(&mut self) -> Result<()>;

    fn set_filters(&mut self, filters: FilterCapabilities) -> Result<()>;

    fn set_quota(&mut self, quota: TimeUnitQuota) -> Result<()>;

    fn limit_session(&mut self, limit: SessionLimit) -> Result<()>;

    fn enable_component(&mut self, component: ComponentSpec) -> Result<()>;

    fn add_captcha(&mut self, captcha: CaptchaSpec) -> Result<()>;

    /// Require WWW-Authenticate credentials on the given path prefixes
    fn set_http_auth(&mut self, rules: &[AuthRule]) -> Result<()>;

    /// Sanitise request input before the host sees it
    fn set_xss_protection(&mut self, xss: XssSpec) -> Result<()>;

    /// Wipe all stored state. Must be idempotent: concurrent requests crossing the
    /// cycle boundary may each call it.
    fn rebuild(&mut self) -> Result<()>;

    /// Evaluate the current request
    fn run(&mut self) -> Result<EngineVerdict>;

    /// Whether the current request carries a solved CAPTCHA
    fn captcha_solved(&mut self) -> Result<bool>;

    /// Lift the ban on the current session
    fn unban(&mut self) -> Result<()>;
}
