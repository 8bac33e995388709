//! Contextual IP policy resolution
//!
//! One parameterised resolver covers all four contexts. Lists are applied to the
//! engine only when they are non-empty, so an empty setting never clears a list that
//! is already in place. Deny-all is applied after the lists; on the login page it can
//! be lifted by the lockdown bypass gate, elsewhere it is unconditional.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::GuardSettings;
use crate::engine::FirewallEngine;
use crate::error::Result;
use crate::request::IncomingRequest;
use crate::security::context::RequestContext;
use crate::security::ip_list::IpPatternList;
use crate::security::lockdown::{BypassDecision, LockdownGate};

/// IP policy resolved for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    pub context: RequestContext,
    pub allow_list: IpPatternList,
    pub deny_list: IpPatternList,
    /// Deny-all is switched on for the context
    pub deny_all_configured: bool,
    /// Deny-all will be handed to the engine (configured and not bypassed)
    pub deny_all_applied: bool,
    /// Bypass gate outcome, present only when the gate was consulted
    pub bypass: Option<BypassDecision>,
}

/// Resolves and applies the IP policy of a context from one settings snapshot
pub struct ContextPolicyResolver<'a> {
    settings: &'a GuardSettings,
}

impl<'a> ContextPolicyResolver<'a> {
    pub fn new(settings: &'a GuardSettings) -> Self {
        Self { settings }
    }

    /// Resolve the policy for `context` without touching the engine
    pub fn resolve(
        &self,
        context: RequestContext,
        request: &IncomingRequest,
        now: DateTime<Utc>,
    ) -> ResolvedPolicy {
        let text = self.settings.policy_text(context);
        let allow_list = IpPatternList::parse(text.allow_list_text);
        let deny_list = IpPatternList::parse(text.deny_list_text);

        let bypass = if text.deny_all && context.supports_bypass() {
            Some(LockdownGate::from_settings(&self.settings.ip_login).evaluate(request, now))
        } else {
            None
        };

        let deny_all_applied = text.deny_all && !bypass.as_ref().is_some_and(|b| b.exempt);

        debug!(
            "Resolved {} policy: {} allowed, {} denied, deny_all={} (applied={})",
            context,
            allow_list.len(),
            deny_list.len(),
            text.deny_all,
            deny_all_applied
        );

        ResolvedPolicy {
            context,
            allow_list,
            deny_list,
            deny_all_configured: text.deny_all,
            deny_all_applied,
            bypass,
        }
    }

    /// Hand a resolved policy to the engine
    pub fn apply<E: FirewallEngine + ?Sized>(policy: &ResolvedPolicy, engine: &mut E) -> Result<()> {
        if !policy.allow_list.is_empty() {
            engine.set_allowed_list(policy.allow_list.as_slice())?;
        }

        if !policy.deny_list.is_empty() {
            engine.set_denied_list(policy.deny_list.as_slice())?;
        }

        if policy.deny_all_applied {
            engine.deny_all()?;
        }

        Ok(())
    }

    /// Resolve and apply in one step
    pub fn resolve_and_apply<E: FirewallEngine + ?Sized>(
        &self,
        context: RequestContext,
        request: &IncomingRequest,
        now: DateTime<Utc>,
        engine: &mut E,
    ) -> Result<ResolvedPolicy> {
        let policy = self.resolve(context, request, now);
        Self::apply(&policy, engine)?;
        Ok(policy)
    }
}
