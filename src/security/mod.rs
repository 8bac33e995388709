//! Per-request access-control resolution
//!
//! This module provides the decision logic that runs in front of the firewall engine:
//! - Request context classification (login, signup, XML-RPC, global)
//! - Exclusion rules that bypass protection entirely
//! - Contextual IP allow/deny policy with deny-all lockdown
//! - Passcode-based lockdown bypass for the login page
//! - Lazy daily data-cycle reset
//! - Filter, component and CAPTCHA composition for the engine
//! - HTTP authentication and XSS protection hand-off

pub mod client_ip;
pub mod components;
pub mod context;
pub mod cycle;
pub mod exclusion;
pub mod filters;
pub mod guardian;
pub mod ip_list;
pub mod lockdown;
pub mod policy;
pub mod protection;

pub use client_ip::resolve_client_ip;
pub use components::{captcha_specs, component_specs};
pub use context::RequestContext;
pub use cycle::{start_of_day, CycleDecision, CycleResetGate, CYCLE_LENGTH_SECS};
pub use exclusion::{ExclusionMatcher, ExclusionRule, RuleOrigin};
pub use filters::{parse_quota, session_limit, FilterComposition};
pub use guardian::{GuardOutcome, Guardian, InitReport};
pub use ip_list::IpPatternList;
pub use lockdown::{BypassCookie, BypassDecision, BypassReason, LockdownGate, BYPASS_COOKIE_NAME};
pub use policy::{ContextPolicyResolver, ResolvedPolicy};
pub use protection::{http_auth_rules, xss_spec};
