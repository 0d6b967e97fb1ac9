//! CLI configuration -- thin wrapper around `frontier_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--host,
//! --port, --pin, --timeout, --output).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use frontier_core::ControllerConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use frontier_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// The `--output` flag, else `defaults.output` from the config, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if let Some(ref format) = global.output_flag {
        return format.clone();
    }
    <OutputFormat as ValueEnum>::from_str(config.defaults.output.trim(), true).unwrap_or_else(|_| {
        tracing::warn!(output = %config.defaults.output, "unknown defaults.output, using table");
        OutputFormat::Table
    })
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides. Flags win over the profile; a bare `--host` works without
/// any config file at all.
pub fn resolve_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut controller = if let Some(profile) = cfg.profiles.get(&profile_name) {
        frontier_config::profile_to_controller_config(profile, &profile_name, &cfg.defaults)?
    } else if let Some(host) = global.host.as_deref() {
        // No profile: an ad-hoc one still picks up PIN env vars and keyring.
        let profile = Profile::new(host);
        frontier_config::profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?
    } else if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    apply_overrides(&mut controller, global)?;
    // Preset tables are fetched on demand; preloading switches modes audibly.
    controller.preload_presets = false;
    Ok(controller)
}

fn apply_overrides(config: &mut ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref host) = global.host {
        let host = host.trim();
        if host.is_empty() {
            return Err(CliError::Validation {
                field: "host".into(),
                reason: "must not be empty".into(),
            });
        }
        host.clone_into(&mut config.host);
    }
    if let Some(port) = global.port {
        config.port = port;
    }
    if let Some(ref pin) = global.pin {
        config.pin = SecretString::from(pin.clone());
    }
    if let Some(timeout) = global.timeout {
        config.timeout = Duration::from_secs(timeout.max(1));
    }
    Ok(())
}
