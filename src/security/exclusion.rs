//! Exclusion matching
//!
//! A request whose URI starts with any exclusion rule bypasses the guard completely:
//! no IP policy, no engine run, no logging in the engine. The rule set is rebuilt
//! from the settings snapshot on every request.

use serde::Serialize;
use tracing::debug;

use crate::config::ExclusionSettings;
use crate::security::context::RequestContext;

/// REST API base, relative to the install directory
pub const REST_API_SUFFIX: &str = "/wp-json/";
/// Theme customizer preview marker, relative to the install directory
pub const CUSTOMIZER_PREVIEW_SUFFIX: &str = "/?customize_changeset_uuid=";

/// Where an exclusion rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "context", rename_all = "snake_case")]
pub enum RuleOrigin {
    /// Entered by the administrator in the free-text list
    Administrator,
    RestApi,
    CustomizerPreview,
    /// Implicit rule for a skipped context page
    Context(RequestContext),
}

/// One path-prefix exclusion rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionRule {
    pub prefix: String,
    pub origin: RuleOrigin,
}

impl ExclusionRule {
    fn new<S: Into<String>>(prefix: S, origin: RuleOrigin) -> Self {
        Self {
            prefix: prefix.into(),
            origin,
        }
    }

    pub fn matches(&self, uri: &str) -> bool {
        uri.starts_with(&self.prefix)
    }
}

/// Ordered exclusion rule set for one request
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    rules: Vec<ExclusionRule>,
}

impl ExclusionMatcher {
    /// Build the effective rule set: administrator prefixes in entry order, then the
    /// REST and customizer rules, then the implicit rules of skipped context pages.
    pub fn from_settings(settings: &ExclusionSettings, install_dir: &str) -> Self {
        let mut rules: Vec<ExclusionRule> = parse_prefix_lines(&settings.excluded_urls)
            .into_iter()
            .map(|prefix| ExclusionRule::new(prefix, RuleOrigin::Administrator))
            .collect();

        if settings.skip_rest_api {
            rules.push(ExclusionRule::new(
                format!("{}{}", install_dir, REST_API_SUFFIX),
                RuleOrigin::RestApi,
            ));
        }

        if settings.skip_customizer_preview {
            rules.push(ExclusionRule::new(
                format!("{}{}", install_dir, CUSTOMIZER_PREVIEW_SUFFIX),
                RuleOrigin::CustomizerPreview,
            ));
        }

        let skipped_contexts = [
            (RequestContext::Login, settings.skip_login),
            (RequestContext::Signup, settings.skip_signup),
            (RequestContext::XmlRpc, settings.skip_xmlrpc),
        ];
        for (context, skipped) in skipped_contexts {
            if let (true, Some(prefix)) = (skipped, context.path_prefix()) {
                rules.push(ExclusionRule::new(prefix, RuleOrigin::Context(context)));
            }
        }

        Self { rules }
    }

    /// Build a matcher from an explicit rule list
    pub fn from_rules(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    /// First rule (in rule order) that is a prefix of `uri`
    pub fn first_match(&self, uri: &str) -> Option<&ExclusionRule> {
        let matched = self.rules.iter().find(|rule| rule.matches(uri));
        if let Some(rule) = matched {
            debug!("Request {} excluded by rule '{}' ({:?})", uri, rule.prefix, rule.origin);
        }
        matched
    }

    pub fn is_excluded(&self, uri: &str) -> bool {
        self.first_match(uri).is_some()
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }
}

/// Split administrator free text into prefixes: one per line, surrounding whitespace
/// removed, blank lines dropped (a blank prefix would match every request).
pub fn parse_prefix_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
