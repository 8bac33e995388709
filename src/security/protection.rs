//! HTTP authentication and XSS protection composition
//!
//! Both are handed to the engine only when something is configured.

use tracing::{debug, warn};

use crate::config::{AuthRule, AuthenticationSettings, XssInput, XssProtectionSettings};
use crate::engine::{FirewallEngine, XssSpec, XssTarget};
use crate::error::Result;

/// Usable protected paths. Entries without a path are dropped.
pub fn http_auth_rules(settings: &AuthenticationSettings) -> Vec<AuthRule> {
    settings
        .protected_paths
        .iter()
        .filter(|rule| {
            let usable = !rule.url.trim().is_empty();
            if !usable {
                warn!("Ignoring HTTP authentication entry for user '{}' without a path", rule.user);
            }
            usable
        })
        .cloned()
        .collect()
}

/// Sanitising spec. Protected entries with an unknown input or no variable name are dropped.
pub fn xss_spec(settings: &XssProtectionSettings) -> XssSpec {
    let protected = settings
        .protected_list
        .iter()
        .filter(|entry| entry.input != XssInput::Unknown)
        .filter_map(|entry| {
            let variable = entry.variable.trim();
            if variable.is_empty() {
                warn!("Ignoring XSS protected entry without a variable name");
                return None;
            }
            Some(XssTarget {
                input: entry.input,
                variable: variable.to_string(),
            })
        })
        .collect();

    XssSpec {
        post: settings.post,
        get: settings.get,
        cookie: settings.cookie,
        protected,
    }
}

pub fn apply_http_auth<E: FirewallEngine + ?Sized>(settings: &AuthenticationSettings, engine: &mut E) -> Result<()> {
    let rules = http_auth_rules(settings);
    if rules.is_empty() {
        return Ok(());
    }
    debug!("Protecting {} path(s) with HTTP authentication", rules.len());
    engine.set_http_auth(&rules)
}

pub fn apply_xss_protection<E: FirewallEngine + ?Sized>(settings: &XssProtectionSettings, engine: &mut E) -> Result<()> {
    let spec = xss_spec(settings);
    if spec.is_empty() {
        return Ok(());
    }
    engine.set_xss_protection(spec)
}
