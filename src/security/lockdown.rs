//! Lockdown bypass gate
//!
//! When deny-all is active on the login page, an operator who knows the configured
//! passcode can still get in. Visiting the login page with the unlock parameter
//! issues a bypass cookie valid for 24 hours; any request carrying that cookie is
//! exempt from deny-all.
//!
//! By default the passcode itself is the query parameter *name* (`/wp-login.php?<passcode>`).
//! Setting `deny_all_unlock_param` switches to a fixed parameter name whose *value*
//! must equal the passcode. Token comparison is constant-time either way.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use crate::config::LoginIpSettings;
use crate::request::IncomingRequest;

/// Name of the cookie carrying the bypass token
pub const BYPASS_COOKIE_NAME: &str = "shieldgate_passcode";

/// Validity window of a freshly issued bypass cookie
pub const BYPASS_COOKIE_TTL_SECS: i64 = 86_400;

/// Cookie the host must set on the response
#[derive(Clone, PartialEq, Eq)]
pub struct BypassCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl BypassCookie {
    fn issue(passcode: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: BYPASS_COOKIE_NAME.to_string(),
            value: passcode.to_string(),
            expires: now + Duration::seconds(BYPASS_COOKIE_TTL_SECS),
        }
    }

    /// Value as it goes on the wire. Passcodes may contain cookie delimiters
    /// (`;`, `,`, whitespace, quotes), so the value is percent-encoded and
    /// `IncomingRequest::with_cookie_header` decodes it again.
    pub fn encoded_value(&self) -> String {
        url::form_urlencoded::byte_serialize(self.value.as_bytes()).collect()
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        format!(
            "{}={}; Expires={}; Path=/; HttpOnly",
            self.name,
            self.encoded_value(),
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }
}

impl fmt::Debug for BypassCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BypassCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("expires", &self.expires)
            .finish()
    }
}

impl Serialize for BypassCookie {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_header_value())
    }
}

/// Why the gate decided the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    /// No passcode configured; deny-all is absolute
    Disabled,
    /// Unlock parameter presented on this request
    UnlockParameter,
    /// Valid bypass cookie presented
    Cookie,
    /// Neither cookie nor unlock parameter
    NoCredential,
    /// Cookie present but does not match the passcode
    Mismatch,
}

/// Outcome of the bypass gate for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassDecision {
    /// Deny-all does not apply to this request
    pub exempt: bool,
    /// Cookie to issue with the response
    pub issue_cookie: Option<BypassCookie>,
    pub reason: BypassReason,
}

impl BypassDecision {
    fn denied(reason: BypassReason) -> Self {
        Self {
            exempt: false,
            issue_cookie: None,
            reason,
        }
    }
}

/// Passcode-based escape hatch for login-page lockdown
pub struct LockdownGate<'a> {
    passcode: &'a Secret<String>,
    unlock_param: Option<&'a str>,
}

impl<'a> LockdownGate<'a> {
    pub fn new(passcode: &'a Secret<String>, unlock_param: Option<&'a str>) -> Self {
        Self {
            passcode,
            unlock_param: unlock_param.filter(|name| !name.is_empty()),
        }
    }

    pub fn from_settings(settings: &'a LoginIpSettings) -> Self {
        Self::new(
            &settings.deny_all_passcode,
            settings.deny_all_unlock_param.as_deref(),
        )
    }

    /// Whether a passcode is configured at all
    pub fn is_enabled(&self) -> bool {
        !self.passcode.expose_secret().is_empty()
    }

    fn unlock_requested(&self, request: &IncomingRequest) -> bool {
        let passcode = self.passcode.expose_secret();
        match self.unlock_param {
            Some(name) => request
                .query_param(name)
                .is_some_and(|value| tokens_match(value, passcode)),
            None => request.has_query_param(passcode),
        }
    }

    /// Evaluate the gate for a request on a locked-down login page
    pub fn evaluate(&self, request: &IncomingRequest, now: DateTime<Utc>) -> BypassDecision {
        if !self.is_enabled() {
            debug!("Lockdown bypass disabled: no passcode configured");
            return BypassDecision::denied(BypassReason::Disabled);
        }
        let passcode = self.passcode.expose_secret();

        let cookie_token = request.bypass_token();

        if self.unlock_requested(request) {
            let issue_cookie = if cookie_token.is_empty() {
                info!("Issuing lockdown bypass cookie valid for {}s", BYPASS_COOKIE_TTL_SECS);
                Some(BypassCookie::issue(passcode, now))
            } else {
                None
            };

            // confirmed for this request without waiting for the cookie round-trip
            return BypassDecision {
                exempt: true,
                issue_cookie,
                reason: BypassReason::UnlockParameter,
            };
        }

        if cookie_token.is_empty() {
            return BypassDecision::denied(BypassReason::NoCredential);
        }

        if tokens_match(cookie_token, passcode) {
            debug!("Lockdown bypass granted by cookie");
            BypassDecision {
                exempt: true,
                issue_cookie: None,
                reason: BypassReason::Cookie,
            }
        } else {
            debug!("Lockdown bypass cookie does not match");
            BypassDecision::denied(BypassReason::Mismatch)
        }
    }
}

/// Exact equality without early exit on the first differing byte
fn tokens_match(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
