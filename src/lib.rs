//! Shieldgate - per-request access-control resolution in front of a web firewall engine
//!
//! Given an incoming request and a fresh settings snapshot, this crate decides whether
//! the request is exempt from protection, classifies it into a protection context,
//! resolves the IP policy for that context (including an emergency lockdown with a
//! passcode bypass), and lazily resets accumulated engine state once per day. The
//! firewall engine itself is an external collaborator behind the `FirewallEngine` trait.

pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod security;
pub mod store;

pub use config::{GuardConfig, GuardSettings};
pub use engine::{DryRunEngine, EngineVerdict, FirewallEngine};
pub use error::{GuardError, Result};
pub use request::IncomingRequest;
pub use security::{GuardOutcome, Guardian, InitReport, RequestContext};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "shieldgate.yaml";
