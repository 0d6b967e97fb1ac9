//! Device writes: power, volume, sources, transport, settings.

use frontier_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, PowerState, PresetArgs, VolumeArgs, VolumeTarget};
use crate::error::CliError;

use super::status::summary_line;

/// Send `cmd` and confirm on stderr with the refreshed state.
pub async fn run(
    controller: &Controller,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    tracing::debug!(command = %cmd, "executing");
    controller.execute(cmd).await?;
    if !global.quiet {
        let modes = controller.store().modes();
        eprintln!("{}", summary_line(&controller.snapshot(), &modes));
    }
    Ok(())
}

pub fn power(state: PowerState) -> CoreCommand {
    match state {
        PowerState::On => CoreCommand::PowerOn,
        PowerState::Off => CoreCommand::PowerOff,
    }
}

pub fn volume(args: &VolumeArgs) -> Result<CoreCommand, CliError> {
    if let Some(percent) = args.percent {
        return Ok(CoreCommand::SetVolumeLevel {
            level: f64::from(percent) / 100.0,
        });
    }
    match args.target {
        Some(VolumeTarget::Step(step)) => Ok(CoreCommand::SetVolume { step }),
        Some(VolumeTarget::Up) => Ok(CoreCommand::VolumeUp),
        Some(VolumeTarget::Down) => Ok(CoreCommand::VolumeDown),
        None => Err(CliError::Validation {
            field: "volume".into(),
            reason: "give a step, 'up', 'down', or --percent".into(),
        }),
    }
}

/// Numeric input is a mode key; anything else is matched against mode
/// names.
pub fn mode(mode: &str) -> CoreCommand {
    let mode = mode.trim();
    if is_key(mode) {
        CoreCommand::SelectMode { mode: mode.into() }
    } else {
        CoreCommand::SelectSource { name: mode.into() }
    }
}

/// A slot key with `--mode` or on its own; otherwise a catalog name.
pub fn preset(args: &PresetArgs) -> CoreCommand {
    let preset = args.preset.trim();
    match args.mode.as_deref().map(str::trim) {
        Some(mode) => CoreCommand::SelectPreset {
            mode: Some(mode.into()),
            key: preset.into(),
        },
        None if is_key(preset) => CoreCommand::SelectPreset {
            mode: None,
            key: preset.into(),
        },
        None => CoreCommand::SelectCatalogPreset {
            name: preset.into(),
        },
    }
}

fn is_key(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
