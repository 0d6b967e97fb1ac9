//! Config subcommand handlers.

use std::time::Duration;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use frontier_core::config::DEFAULT_PIN;
use frontier_core::{Controller, ControllerConfig};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking PINs.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        let _ = writeln!(out, "port = {}", p.port);
        if p.pin.is_some() {
            let _ = writeln!(out, "pin = \"****\"");
        }
        if let Some(ref env) = p.pin_env {
            let _ = writeln!(out, "pin_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.poll_interval {
            let _ = writeln!(out, "poll_interval = {interval}");
        }
        if let Some(ref modes) = p.preset_modes {
            let _ = writeln!(out, "preset_modes = {modes:?}");
        }
        if let Some(ref labels) = p.unnamed_preset_labels {
            let _ = writeln!(out, "unnamed_preset_labels = {labels:?}");
        }
    }

    out
}

/// Structured output gets the same masking as the table view.
fn redacted(cfg: &Config) -> Config {
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: config::Defaults {
            output: cfg.defaults.output.clone(),
            timeout: cfg.defaults.timeout,
            poll_interval: cfg.defaults.poll_interval,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                if p.pin.is_some() {
                    p.pin = Some("****".into());
                }
                (name.clone(), p)
            })
            .collect(),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_pin() -> Result<String, CliError> {
    let pin = rpassword::prompt_password("PIN (blank for 1234): ").map_err(prompt_err)?;
    let pin = pin.trim();
    if pin.is_empty() {
        return Ok(DEFAULT_PIN.into());
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CliError::Validation {
            field: "pin".into(),
            reason: "must be digits only".into(),
        });
    }
    Ok(pin.to_owned())
}

/// Offer to store the PIN in the system keyring or return it for plaintext
/// config.
///
/// Returns `Some(pin)` if the user chose plaintext, `None` if stored in the
/// keyring.
fn prompt_pin_storage(pin: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the PIN?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        frontier_config::store_pin(profile_name, pin)?;
        eprintln!("   ✓ PIN stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(pin.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: wizard, or flags only with --host ─────────────────
        ConfigCommand::Init(init) => {
            let config_path = config::config_path();
            let interactive = global.host.is_none();
            if interactive {
                eprintln!("frontier -- configuration wizard");
                eprintln!("   Config path: {}\n", config_path.display());
            }

            let profile_name = match init.name {
                Some(name) => name,
                None if interactive => Input::new()
                    .with_prompt("Profile name")
                    .default("default".into())
                    .interact_text()
                    .map_err(prompt_err)?,
                None => "default".into(),
            };

            let host = match global.host.clone() {
                Some(host) => host,
                None => Input::new()
                    .with_prompt("Radio hostname or IP")
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            let host = host.trim().to_owned();
            if host.is_empty() {
                return Err(CliError::Validation {
                    field: "host".into(),
                    reason: "must not be empty".into(),
                });
            }

            let port = match global.port {
                Some(port) => port,
                None if interactive => Input::new()
                    .with_prompt("HTTP port")
                    .default(80)
                    .interact_text()
                    .map_err(prompt_err)?,
                None => 80,
            };

            let pin = match global.pin.clone() {
                Some(pin) => pin,
                None if interactive => prompt_pin()?,
                None => DEFAULT_PIN.into(),
            };

            let mut cfg = config::load_config_or_default();
            if !init.no_verify {
                let mut candidate = ControllerConfig::new(host.as_str());
                candidate.port = port;
                candidate.pin = SecretString::from(pin.clone());
                candidate.timeout =
                    Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout).max(1));
                let name = Controller::verify(&candidate).await?;
                if !global.quiet {
                    eprintln!("   ✓ Found {}", name.as_deref().unwrap_or("a radio"));
                }
            }

            let pin_field = if pin == DEFAULT_PIN {
                None
            } else if init.plaintext_pin {
                Some(pin)
            } else if interactive {
                prompt_pin_storage(&pin, &profile_name)?
            } else {
                frontier_config::store_pin(&profile_name, &pin)?;
                None
            };

            let mut profile = Profile::new(host);
            profile.port = port;
            profile.pin = pin_field;

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("\n✓ Configuration written to {}", config_path.display());
                eprintln!("  Active profile: {profile_name}");
                eprintln!("\n  Test it: frontier status");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set-pin ─────────────────────────────────────────────────
        ConfigCommand::SetPin { value } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let pin = match value {
                Some(pin) => pin,
                None => prompt_pin()?,
            };
            frontier_config::store_pin(&profile_name, &pin)?;
            if !global.quiet {
                eprintln!("✓ PIN for profile '{profile_name}' stored in system keyring");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
            names.sort();
            let out = names
                .iter()
                .map(|name| {
                    let marker = if *name == active { "*" } else { " " };
                    format!("{marker} {name}  ({})", cfg.profiles[name].host)
                })
                .collect::<Vec<_>>()
                .join("\n");
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use ─────────────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
