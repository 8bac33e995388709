//! Values handed to the firewall engine

use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::config::{RecaptchaVersion, XssInput};

/// Filter subsystem capability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCapabilities {
    pub session: bool,
    pub cookie: bool,
    pub referer: bool,
    pub frequency: bool,
}

/// Page-view allowances per time unit for the frequency filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeUnitQuota {
    pub second: u32,
    pub minute: u32,
    pub hour: u32,
    pub day: u32,
}

impl Default for TimeUnitQuota {
    fn default() -> Self {
        Self {
            second: 2,
            minute: 10,
            hour: 30,
            day: 60,
        }
    }
}

/// Online session limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionLimit {
    /// Maximum concurrent online sessions
    pub count: u32,
    /// How long a session is considered alive, in seconds
    pub period_secs: u64,
}

impl Default for SessionLimit {
    fn default() -> Self {
        Self {
            count: 100,
            period_secs: 300,
        }
    }
}

/// Engine components that can be switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Ip,
    TrustedBot,
    Header,
    UserAgent,
    Rdns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    /// Strict mode (only meaningful for header, user-agent and rDNS)
    pub strict: bool,
}

/// CAPTCHA provider configuration
#[derive(Debug)]
pub enum CaptchaSpec {
    Recaptcha {
        key: String,
        secret: Secret<String>,
        version: RecaptchaVersion,
        lang: String,
    },
    Image {
        /// Characters the challenge word is drawn from
        pool: &'static str,
        word_length: u32,
    },
}

impl CaptchaSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            CaptchaSpec::Recaptcha { .. } => "recaptcha",
            CaptchaSpec::Image { .. } => "image",
        }
    }

    /// Whether the provider is usable; reCAPTCHA without a key pair cannot verify anything
    pub fn is_configured(&self) -> bool {
        match self {
            CaptchaSpec::Recaptcha { key, secret, .. } => {
                !key.is_empty() && !secret.expose_secret().is_empty()
            }
            CaptchaSpec::Image { pool, word_length } => !pool.is_empty() && *word_length > 0,
        }
    }
}

/// One variable sanitised on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XssTarget {
    pub input: XssInput,
    pub variable: String,
}

/// Input sanitising for the current request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XssSpec {
    pub post: bool,
    pub get: bool,
    pub cookie: bool,
    pub protected: Vec<XssTarget>,
}

impl XssSpec {
    /// Nothing to sanitise
    pub fn is_empty(&self) -> bool {
        !self.post && !self.get && !self.cookie && self.protected.is_empty()
    }
}

/// Decision returned by the engine for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineVerdict {
    Allow,
    Deny,
    TemporarilyDeny,
    LimitSession,
}

impl EngineVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, EngineVerdict::Allow)
    }
}
