//! Typed per-request settings snapshot
//!
//! Administrator settings are grouped in the same sections the settings UI uses.
//! Every field has a default matching the UI default, so a partial (or empty)
//! document always yields a usable snapshot.

use chrono::{FixedOffset, Offset, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::security::context::RequestContext;

/// Toggle values accept YAML booleans as well as the legacy `"yes"`/`"no"` strings.
mod toggle {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
        Number(i64),
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => b,
            Raw::Number(n) => n != 0,
            Raw::Text(text) => super::parse_toggle_text(&text),
        })
    }
}

/// Numeric settings are stored as free text by the settings UI; keep them as
/// text here and let the consumers decide the fallback.
mod setting_text {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(text) => serializer.serialize_some(text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Integer(n) => n.to_string(),
            Raw::Float(f) => f.to_string(),
            Raw::Bool(b) => b.to_string(),
        }))
    }
}

/// Custom serde module for Secret<String>
mod secret_string {
    use secrecy::{ExposeSecret, Secret};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Secret::new(s))
    }
}

fn parse_toggle_text(text: &str) -> bool {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => true,
        "no" | "false" | "off" | "0" | "" => false,
        other => {
            warn!("Unrecognised toggle value '{}', treating as off", other);
            false
        }
    }
}

/// Complete settings snapshot for one request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// Site identity used to derive built-in exclusion paths and the day boundary
    pub site: SiteSettings,
    /// Daemon-level behaviour (cycle reset, IP source, session limit)
    pub daemon: DaemonSettings,
    /// Engine component toggles
    pub component: ComponentSettings,
    /// Filter toggles and frequency quotas
    pub filter: FilterSettings,
    /// CAPTCHA configuration handed to the engine
    pub captcha: CaptchaSettings,
    /// Paths protected by HTTP authentication
    pub authentication: AuthenticationSettings,
    /// Input sanitising toggles
    pub xss_protection: XssProtectionSettings,
    /// Exclusion rules
    pub exclusion: ExclusionSettings,
    /// IP policy for the login page (the only context with a lockdown bypass)
    pub ip_login: LoginIpSettings,
    /// IP policy for the signup page
    pub ip_signup: ContextIpSettings,
    /// IP policy for the XML-RPC endpoint
    pub ip_xmlrpc: ContextIpSettings,
    /// IP policy for all other traffic
    pub ip_global: ContextIpSettings,
}

/// Borrowed view of the list/deny-all settings of one context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextPolicyText<'a> {
    pub allow_list_text: &'a str,
    pub deny_list_text: &'a str,
    pub deny_all: bool,
}

impl GuardSettings {
    /// Select the IP policy settings that apply to `context`.
    pub fn policy_text(&self, context: RequestContext) -> ContextPolicyText<'_> {
        match context {
            RequestContext::Login => self.ip_login.policy_text(),
            RequestContext::Signup => self.ip_signup.policy_text(),
            RequestContext::XmlRpc => self.ip_xmlrpc.policy_text(),
            RequestContext::Global => self.ip_global.policy_text(),
        }
    }
}

/// Site identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Public site URL; its path component is the install directory
    pub url: String,
    /// Offset from UTC, in minutes, used to find the start of the calendar day
    pub utc_offset_minutes: i32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost/".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl SiteSettings {
    /// Install directory of the site: the URL path without trailing slashes,
    /// empty when the site lives at the web root.
    pub fn install_dir(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(url) => url.path().trim_end_matches('/').to_string(),
            Err(e) => {
                warn!("Invalid site URL '{}': {}; assuming web root", self.url, e);
                String::new()
            }
        }
    }

    /// Fixed UTC offset of the site; out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "UTC offset of {} minutes is out of range, using UTC",
                    self.utc_offset_minutes
                );
                Utc.fix()
            })
    }
}

/// Where the client address is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IpSource {
    #[default]
    RemoteAddr,
    CfConnectingIp,
    XForwardedFor,
    XForwardedHost,
}

impl IpSource {
    /// Setting value as stored by the settings UI
    pub fn as_str(&self) -> &'static str {
        match self {
            IpSource::RemoteAddr => "REMOTE_ADDR",
            IpSource::CfConnectingIp => "HTTP_CF_CONNECTING_IP",
            IpSource::XForwardedFor => "HTTP_X_FORWARDED_FOR",
            IpSource::XForwardedHost => "HTTP_X_FORWARDED_HOST",
        }
    }

    /// Request header consulted for this source, if any
    pub fn header_name(&self) -> Option<&'static str> {
        match self {
            IpSource::RemoteAddr => None,
            IpSource::CfConnectingIp => Some("cf-connecting-ip"),
            IpSource::XForwardedFor => Some("x-forwarded-for"),
            IpSource::XForwardedHost => Some("x-forwarded-host"),
        }
    }
}

impl From<String> for IpSource {
    fn from(value: String) -> Self {
        match value.trim() {
            "REMOTE_ADDR" | "" => IpSource::RemoteAddr,
            "HTTP_CF_CONNECTING_IP" => IpSource::CfConnectingIp,
            "HTTP_X_FORWARDED_FOR" => IpSource::XForwardedFor,
            "HTTP_X_FORWARDED_HOST" => IpSource::XForwardedHost,
            other => {
                warn!("Unknown ip_source '{}', using REMOTE_ADDR", other);
                IpSource::RemoteAddr
            }
        }
    }
}

impl From<IpSource> for String {
    fn from(value: IpSource) -> Self {
        value.as_str().to_string()
    }
}

/// Daemon section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Wipe accumulated engine state once per calendar day
    #[serde(with = "toggle", alias = "reset_data_circle")]
    pub reset_data_cycle: bool,
    pub ip_source: IpSource,
    #[serde(with = "toggle")]
    pub enable_online_session_limit: bool,
    /// Maximum concurrent online sessions (text, default 100)
    #[serde(with = "setting_text")]
    pub session_limit_count: Option<String>,
    /// Session alive period in minutes (text, default 5)
    #[serde(with = "setting_text")]
    pub session_limit_period: Option<String>,
}

/// Component section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSettings {
    #[serde(with = "toggle")]
    pub enable_component_trustedbot: bool,
    #[serde(with = "toggle")]
    pub enable_component_header: bool,
    #[serde(with = "toggle")]
    pub header_strict_mode: bool,
    #[serde(with = "toggle")]
    pub enable_component_agent: bool,
    #[serde(with = "toggle")]
    pub agent_strict_mode: bool,
    #[serde(with = "toggle")]
    pub enable_component_rdns: bool,
    #[serde(with = "toggle")]
    pub rdns_strict_mode: bool,
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            enable_component_trustedbot: true,
            enable_component_header: false,
            header_strict_mode: false,
            enable_component_agent: false,
            agent_strict_mode: false,
            enable_component_rdns: false,
            rdns_strict_mode: false,
        }
    }
}

/// Filter section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    #[serde(with = "toggle")]
    pub enable_filter_session: bool,
    #[serde(with = "toggle")]
    pub enable_filter_cookie: bool,
    #[serde(with = "toggle")]
    pub enable_filter_referer: bool,
    #[serde(with = "toggle")]
    pub enable_filter_frequency: bool,
    #[serde(with = "setting_text")]
    pub time_unit_quota_s: Option<String>,
    #[serde(with = "setting_text")]
    pub time_unit_quota_m: Option<String>,
    #[serde(with = "setting_text")]
    pub time_unit_quota_h: Option<String>,
    #[serde(with = "setting_text")]
    pub time_unit_quota_d: Option<String>,
}

/// reCAPTCHA API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecaptchaVersion {
    #[default]
    V2,
    V3,
}

impl From<String> for RecaptchaVersion {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "v3" => RecaptchaVersion::V3,
            "v2" | "" => RecaptchaVersion::V2,
            other => {
                warn!("Unknown reCAPTCHA version '{}', using v2", other);
                RecaptchaVersion::V2
            }
        }
    }
}

impl From<RecaptchaVersion> for String {
    fn from(value: RecaptchaVersion) -> Self {
        match value {
            RecaptchaVersion::V2 => "v2".to_string(),
            RecaptchaVersion::V3 => "v3".to_string(),
        }
    }
}

/// Character pool used by the image CAPTCHA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageCaptchaType {
    Numeric,
    Alpha,
    #[default]
    Alnum,
}

impl From<String> for ImageCaptchaType {
    fn from(value: String) -> Self {
        match value.trim() {
            "numeric" => ImageCaptchaType::Numeric,
            "alpha" => ImageCaptchaType::Alpha,
            _ => ImageCaptchaType::Alnum,
        }
    }
}

impl From<ImageCaptchaType> for String {
    fn from(value: ImageCaptchaType) -> Self {
        match value {
            ImageCaptchaType::Numeric => "numeric".to_string(),
            ImageCaptchaType::Alpha => "alpha".to_string(),
            ImageCaptchaType::Alnum => "alnum".to_string(),
        }
    }
}

/// CAPTCHA section
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaSettings {
    #[serde(with = "toggle")]
    pub enable_captcha_google: bool,
    pub google_recaptcha_key: String,
    #[serde(with = "secret_string")]
    pub google_recaptcha_secret: Secret<String>,
    pub google_recaptcha_version: RecaptchaVersion,
    pub google_recaptcha_lang: String,
    #[serde(with = "toggle")]
    pub enable_captcha_image: bool,
    pub image_captcha_type: ImageCaptchaType,
    #[serde(with = "setting_text")]
    pub image_captcha_length: Option<String>,
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            enable_captcha_google: true,
            google_recaptcha_key: String::new(),
            google_recaptcha_secret: Secret::new(String::new()),
            google_recaptcha_version: RecaptchaVersion::V2,
            google_recaptcha_lang: "en-US".to_string(),
            enable_captcha_image: false,
            image_captcha_type: ImageCaptchaType::Alnum,
            image_captcha_length: None,
        }
    }
}

impl Clone for CaptchaSettings {
    fn clone(&self) -> Self {
        Self {
            enable_captcha_google: self.enable_captcha_google,
            google_recaptcha_key: self.google_recaptcha_key.clone(),
            google_recaptcha_secret: Secret::new(self.google_recaptcha_secret.expose_secret().clone()),
            google_recaptcha_version: self.google_recaptcha_version,
            google_recaptcha_lang: self.google_recaptcha_lang.clone(),
            enable_captcha_image: self.enable_captcha_image,
            image_captcha_type: self.image_captcha_type,
            image_captcha_length: self.image_captcha_length.clone(),
        }
    }
}

/// One path prefix protected by WWW-Authenticate
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthRule {
    /// Path prefix the credentials guard
    pub url: String,
    pub user: String,
    /// Password hash as stored by the settings UI
    #[serde(with = "secret_string")]
    pub pass: Secret<String>,
}

impl Clone for AuthRule {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            user: self.user.clone(),
            pass: Secret::new(self.pass.expose_secret().clone()),
        }
    }
}

/// Authentication section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationSettings {
    #[serde(alias = "shieldon_authetication")]
    pub protected_paths: Vec<AuthRule>,
}

/// Request input a protected variable is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum XssInput {
    Get,
    Post,
    Cookie,
    /// Unrecognised input type; the entry is ignored
    Unknown,
}

impl From<String> for XssInput {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => XssInput::Get,
            "post" => XssInput::Post,
            "cookie" => XssInput::Cookie,
            other => {
                warn!("Unknown XSS input type '{}', ignoring entry", other);
                XssInput::Unknown
            }
        }
    }
}

impl From<XssInput> for String {
    fn from(value: XssInput) -> Self {
        match value {
            XssInput::Get => "get".to_string(),
            XssInput::Post => "post".to_string(),
            XssInput::Cookie => "cookie".to_string(),
            XssInput::Unknown => "unknown".to_string(),
        }
    }
}

/// Single variable sanitised regardless of the per-input toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XssProtectedVariable {
    #[serde(rename = "type")]
    pub input: XssInput,
    #[serde(default)]
    pub variable: String,
}

/// XSS protection section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XssProtectionSettings {
    /// Sanitise every POST field
    #[serde(with = "toggle")]
    pub post: bool,
    /// Sanitise every query parameter
    #[serde(with = "toggle")]
    pub get: bool,
    /// Sanitise every cookie
    #[serde(with = "toggle")]
    pub cookie: bool,
    #[serde(alias = "xss_protected_list")]
    pub protected_list: Vec<XssProtectedVariable>,
}

/// Exclusion section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionSettings {
    /// Additional excluded path prefixes, one per line
    pub excluded_urls: String,
    #[serde(with = "toggle", alias = "ignore_page_login")]
    pub skip_login: bool,
    #[serde(with = "toggle", alias = "ignore_page_signup")]
    pub skip_signup: bool,
    #[serde(with = "toggle", alias = "ignore_wp_xmlrpc")]
    pub skip_xmlrpc: bool,
    #[serde(with = "toggle", alias = "ignore_wp_json")]
    pub skip_rest_api: bool,
    #[serde(with = "toggle", alias = "ignore_wp_theme_customizer")]
    pub skip_customizer_preview: bool,
}

impl Default for ExclusionSettings {
    fn default() -> Self {
        Self {
            excluded_urls: String::new(),
            skip_login: false,
            skip_signup: false,
            skip_xmlrpc: true,
            skip_rest_api: true,
            skip_customizer_preview: true,
        }
    }
}

/// IP policy of a context without a lockdown bypass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextIpSettings {
    /// Allowed IPs/CIDRs, one per line
    #[serde(alias = "whitelist")]
    pub allow_list: String,
    /// Denied IPs/CIDRs, one per line
    #[serde(alias = "blacklist")]
    pub deny_list: String,
    #[serde(with = "toggle")]
    pub deny_all: bool,
}

impl ContextIpSettings {
    pub fn policy_text(&self) -> ContextPolicyText<'_> {
        ContextPolicyText {
            allow_list_text: &self.allow_list,
            deny_list_text: &self.deny_list,
            deny_all: self.deny_all,
        }
    }
}

/// IP policy of the login context, including the lockdown passcode
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginIpSettings {
    #[serde(alias = "whitelist")]
    pub allow_list: String,
    #[serde(alias = "blacklist")]
    pub deny_list: String,
    #[serde(with = "toggle")]
    pub deny_all: bool,
    /// Lockdown passcode; empty disables the bypass
    #[serde(with = "secret_string")]
    pub deny_all_passcode: Secret<String>,
    /// Fixed unlock query parameter name. When unset, the passcode itself is
    /// the parameter name.
    pub deny_all_unlock_param: Option<String>,
}

impl Default for LoginIpSettings {
    fn default() -> Self {
        Self {
            allow_list: String::new(),
            deny_list: String::new(),
            deny_all: false,
            deny_all_passcode: Secret::new(String::new()),
            deny_all_unlock_param: None,
        }
    }
}

impl Clone for LoginIpSettings {
    fn clone(&self) -> Self {
        Self {
            allow_list: self.allow_list.clone(),
            deny_list: self.deny_list.clone(),
            deny_all: self.deny_all,
            deny_all_passcode: Secret::new(self.deny_all_passcode.expose_secret().clone()),
            deny_all_unlock_param: self.deny_all_unlock_param.clone(),
        }
    }
}

impl LoginIpSettings {
    pub fn policy_text(&self) -> ContextPolicyText<'_> {
        ContextPolicyText {
            allow_list_text: &self.allow_list,
            deny_list_text: &self.deny_list,
            deny_all: self.deny_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let settings: GuardSettings = serde_yaml::from_str("{}").unwrap();
        assert!(!settings.daemon.reset_data_cycle);
        assert!(settings.component.enable_component_trustedbot);
        assert!(settings.exclusion.skip_rest_api);
        assert!(settings.exclusion.skip_xmlrpc);
        assert!(!settings.exclusion.skip_login);
        assert_eq!(settings.daemon.ip_source, IpSource::RemoteAddr);
        assert_eq!(settings.captcha.google_recaptcha_lang, "en-US");
    }

    #[test]
    fn test_legacy_toggle_strings() {
        let yaml = r#"
daemon:
  reset_data_circle: "yes"
exclusion:
  ignore_page_login: "yes"
  ignore_wp_json: "no"
ip_signup:
  deny_all: "yes"
"#;
        let settings: GuardSettings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.daemon.reset_data_cycle);
        assert!(settings.exclusion.skip_login);
        assert!(!settings.exclusion.skip_rest_api);
        assert!(settings.ip_signup.deny_all);
    }

    #[test]
    fn test_numeric_settings_kept_as_text() {
        let yaml = r#"
filter:
  time_unit_quota_s: 7
  time_unit_quota_m: "abc"
"#;
        let settings: GuardSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.filter.time_unit_quota_s.as_deref(), Some("7"));
        assert_eq!(settings.filter.time_unit_quota_m.as_deref(), Some("abc"));
        assert_eq!(settings.filter.time_unit_quota_h, None);
    }

    #[test]
    fn test_passcode_is_redacted_in_debug() {
        let yaml = "ip_login:\n  deny_all_passcode: X7k\n";
        let settings: GuardSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.ip_login.deny_all_passcode.expose_secret(), "X7k");
        assert!(!format!("{:?}", settings).contains("X7k"));
    }

    #[test]
    fn test_recaptcha_version_and_lang_are_independent() {
        let yaml = r#"
captcha:
  google_recaptcha_version: v3
  google_recaptcha_lang: fr
"#;
        let settings: GuardSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.captcha.google_recaptcha_version, RecaptchaVersion::V3);
        assert_eq!(settings.captcha.google_recaptcha_lang, "fr");
    }

    #[test]
    fn test_unknown_ip_source_falls_back() {
        let settings: GuardSettings =
            serde_yaml::from_str("daemon:\n  ip_source: HTTP_TRUE_CLIENT_IP\n").unwrap();
        assert_eq!(settings.daemon.ip_source, IpSource::RemoteAddr);

        let settings: GuardSettings =
            serde_yaml::from_str("daemon:\n  ip_source: HTTP_CF_CONNECTING_IP\n").unwrap();
        assert_eq!(settings.daemon.ip_source, IpSource::CfConnectingIp);
    }

    #[test]
    fn test_install_dir() {
        let mut site = SiteSettings::default();
        assert_eq!(site.install_dir(), "");

        site.url = "https://example.com/blog/".to_string();
        assert_eq!(site.install_dir(), "/blog");

        site.url = "not a url".to_string();
        assert_eq!(site.install_dir(), "");
    }

    #[test]
    fn test_policy_text_selects_context() {
        let mut settings = GuardSettings::default();
        settings.ip_login.allow_list = "1.1.1.1".to_string();
        settings.ip_global.deny_list = "10.0.0.1".to_string();
        settings.ip_xmlrpc.deny_all = true;

        assert_eq!(settings.policy_text(RequestContext::Login).allow_list_text, "1.1.1.1");
        assert_eq!(settings.policy_text(RequestContext::Global).deny_list_text, "10.0.0.1");
        assert!(settings.policy_text(RequestContext::XmlRpc).deny_all);
        assert!(!settings.policy_text(RequestContext::Signup).deny_all);
    }

    #[test]
    fn test_authentication_and_xss_sections() {
        let yaml = r#"
authentication:
  protected_paths:
    - url: /wp-admin/
      user: ops
      pass: $2y$10$hash
xss_protection:
  post: "yes"
  cookie: "no"
  protected_list:
    - type: get
      variable: s
    - type: header
      variable: x
"#;
        let settings: GuardSettings = serde_yaml::from_str(yaml).unwrap();
        let rule = &settings.authentication.protected_paths[0];
        assert_eq!(rule.url, "/wp-admin/");
        assert_eq!(rule.pass.expose_secret(), "$2y$10$hash");
        assert!(!format!("{:?}", settings.authentication).contains("$2y$10$hash"));

        let xss = &settings.xss_protection;
        assert!(xss.post && !xss.get && !xss.cookie);
        assert_eq!(xss.protected_list[0].input, XssInput::Get);
        assert_eq!(xss.protected_list[1].input, XssInput::Unknown);
    }
}
