//! Command-line interface for shieldgate
//!
//! Evaluates requests against a settings file with a dry-run engine, inspects the
//! effective configuration and the data-cycle state, and writes a starter config.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use serde_json::json;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use shieldgate::config::{EnvironmentOverrides, LoggingConfig};
use shieldgate::security::{
    captcha_specs, component_specs, http_auth_rules, session_limit, xss_spec, CycleResetGate,
    ExclusionMatcher, FilterComposition, IpPatternList, LockdownGate,
};
use shieldgate::store::FileSettingsStore;
use shieldgate::{
    DryRunEngine, GuardConfig, Guardian, IncomingRequest, MemorySettingsStore, RequestContext,
    SettingsStore,
};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = shieldgate::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one request against the settings with a dry-run engine
    Check {
        /// Request URI (path and query string)
        #[arg(short, long)]
        uri: String,
        /// Client socket address
        #[arg(long)]
        ip: Option<IpAddr>,
        /// Value of the lockdown bypass cookie
        #[arg(long)]
        cookie: Option<String>,
        /// Request header as NAME:VALUE (repeatable)
        #[arg(long = "header", value_name = "NAME:VALUE")]
        headers: Vec<String>,
        /// Evaluate as of this instant (RFC 3339) instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Show the effective configuration
    Status,
    /// Write a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = shieldgate::DEFAULT_CONFIG_FILE)]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the data-cycle state and what the reset gate would decide
    Cycle {
        /// Evaluate as of this instant (RFC 3339) instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { output, force } = &cli.command {
        init_logging(&LoggingConfig::default(), cli.log_level.as_deref())?;
        return init_config(output, *force);
    }

    let (config_path, config) = GuardConfig::discover(&cli.config)
        .with_context(|| format!("Failed to load configuration (default {})", cli.config.display()))?;

    init_logging(&config.logging, cli.log_level.as_deref())?;
    debug!("Loaded configuration from {}", config_path.display());
    let overrides = EnvironmentOverrides::load()?;
    if overrides.has_overrides() {
        debug!("Environment overrides active: {:?}", overrides);
    }

    let store = FileSettingsStore::new(&config_path, &config.state.file);

    match cli.command {
        Commands::Check {
            uri,
            ip,
            cookie,
            headers,
            at,
        } => check_request(&config, &store, uri, ip, cookie, &headers, at.unwrap_or_else(Utc::now)),
        Commands::Status => show_status(&config, &config_path, &store),
        Commands::Cycle { at } => show_cycle(&config, &store, at.unwrap_or_else(Utc::now)),
        Commands::Init { .. } => Ok(()),
    }
}

fn init_logging(logging: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = cli_level.unwrap_or(&logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

fn parse_header(raw: &str) -> Result<(&str, &str)> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .with_context(|| format!("Invalid header '{}', expected NAME:VALUE", raw))
}

fn check_request(
    config: &GuardConfig,
    store: &FileSettingsStore,
    uri: String,
    ip: Option<IpAddr>,
    cookie: Option<String>,
    headers: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let mut request = IncomingRequest::new(uri);
    if let Some(ip) = ip {
        request = request.with_peer_addr(ip);
    }
    if let Some(cookie) = cookie {
        request = request.with_bypass_cookie(cookie);
    }
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }

    // dry run: the persisted cycle marker is read but never written back
    let mut scratch = MemorySettingsStore::new(config.settings.clone());
    if let Some(epoch) = store.last_reset_epoch()? {
        scratch = scratch.with_last_reset_epoch(epoch);
    }

    let guardian = Guardian::new(config.settings.clone(), request);
    let mut engine = DryRunEngine::new();
    let report = guardian.init(&mut engine, &scratch, now)?;
    let outcome = guardian.run(&mut engine)?;

    info!("{} request evaluated: {:?}", report.context, outcome);

    let output = json!({
        "uri": guardian.request().uri,
        "context": report.context,
        "excluded_by": report.excluded_by,
        "client_ip": report.client_ip,
        "cycle": report.cycle,
        "deny_all": report.policy.as_ref().map(|p| json!({
            "configured": p.deny_all_configured,
            "applied": p.deny_all_applied,
            "bypass": p.bypass.as_ref().map(|b| b.reason),
        })),
        "engine_calls": engine.calls(),
        "outcome": outcome,
        "set_cookie": report.bypass_cookie().map(|c| c.to_header_value()),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn show_status(config: &GuardConfig, config_path: &Path, store: &FileSettingsStore) -> Result<()> {
    let settings = &config.settings;
    let install_dir = settings.site.install_dir();
    let exclusions = ExclusionMatcher::from_settings(&settings.exclusion, &install_dir);
    let passcode = if LockdownGate::from_settings(&settings.ip_login).is_enabled() {
        "[REDACTED]"
    } else {
        ""
    };

    let contexts: Vec<_> = RequestContext::PATH_CONTEXTS
        .iter()
        .copied()
        .chain(std::iter::once(RequestContext::Global))
        .map(|context| {
            let text = settings.policy_text(context);
            json!({
                "context": context,
                "allow_list": IpPatternList::parse(text.allow_list_text).len(),
                "deny_list": IpPatternList::parse(text.deny_list_text).len(),
                "deny_all": text.deny_all,
            })
        })
        .collect();

    let output = json!({
        "version": shieldgate::VERSION,
        "config_file": config_path.display().to_string(),
        "state_file": store.state_path().display().to_string(),
        "site": {
            "url": settings.site.url,
            "install_dir": install_dir,
            "utc_offset_minutes": settings.site.utc_offset_minutes,
        },
        "daemon": {
            "reset_data_cycle": settings.daemon.reset_data_cycle,
            "ip_source": settings.daemon.ip_source.as_str(),
            "session_limit": session_limit(&settings.daemon),
        },
        "exclusions": exclusions.rules(),
        "contexts": contexts,
        "lockdown": {
            "passcode": passcode,
            "unlock_param": settings.ip_login.deny_all_unlock_param,
        },
        "filters": FilterComposition::from_settings(&settings.filter).capabilities,
        "components": component_specs(&settings.component),
        "captcha": captcha_specs(&settings.captcha)
            .iter()
            .map(|spec| spec.kind())
            .collect::<Vec<_>>(),
        "http_auth_paths": http_auth_rules(&settings.authentication)
            .iter()
            .map(|rule| rule.url.clone())
            .collect::<Vec<_>>(),
        "xss_protection": xss_spec(&settings.xss_protection),
        "recaptcha_secret_set": !settings.captcha.google_recaptcha_secret.expose_secret().is_empty(),
        "last_reset_epoch": store.last_reset_epoch()?,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn show_cycle(config: &GuardConfig, store: &FileSettingsStore, now: DateTime<Utc>) -> Result<()> {
    let gate = CycleResetGate::from_settings(&config.settings);
    let last = store.last_reset_epoch()?;
    let decision = gate.evaluate(last, now);

    let output = json!({
        "enabled": config.settings.daemon.reset_data_cycle,
        "now": now.to_rfc3339(),
        "last_reset_epoch": last,
        "last_reset": last
            .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
            .map(|t| t.to_rfc3339()),
        "decision": decision,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            output.display()
        );
    }

    let yaml = serde_yaml::to_string(&GuardConfig::default())?;
    std::fs::write(output, yaml)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote default configuration to {}", output.display());
    println!("Configuration written to {}", output.display());
    Ok(())
}
