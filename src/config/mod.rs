//! Configuration module for shieldgate
//!
//! This module provides configuration loading and the typed settings snapshot
//! consumed by the guard pipeline.

mod config;
pub mod environment;
pub mod settings;

// Re-export the main configuration types
pub use config::{GuardConfig, LoggingConfig, StateConfig};
pub use environment::{EnvVars, EnvironmentOverrides};
pub use settings::{
    AuthRule, AuthenticationSettings, CaptchaSettings, ComponentSettings, ContextIpSettings,
    ContextPolicyText, DaemonSettings, ExclusionSettings, FilterSettings, GuardSettings,
    ImageCaptchaType, IpSource, LoginIpSettings, RecaptchaVersion, SiteSettings, XssInput,
    XssProtectedVariable, XssProtectionSettings,
};
