//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod sources;
pub mod status;

use frontier_core::{Command as CoreCommand, Controller};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::status(controller, global).await,
        Command::Watch(args) => status::watch(controller, &args, global).await,
        Command::Info => status::info(controller, global).await,
        Command::Modes => sources::modes(controller, global).await,
        Command::Presets(args) => sources::presets(controller, &args, global).await,

        Command::Power(args) => control::run(controller, control::power(args.state), global).await,
        Command::Volume(args) => control::run(controller, control::volume(&args)?, global).await,
        Command::Mute => control::run(controller, CoreCommand::Mute, global).await,
        Command::Unmute => control::run(controller, CoreCommand::Unmute, global).await,
        Command::Mode(args) => control::run(controller, control::mode(&args.mode), global).await,
        Command::Preset(args) => control::run(controller, control::preset(&args), global).await,
        Command::Play => control::run(controller, CoreCommand::Play, global).await,
        Command::Pause => control::run(controller, CoreCommand::Pause, global).await,
        Command::Stop => control::run(controller, CoreCommand::Stop, global).await,
        Command::Next => control::run(controller, CoreCommand::NextTrack, global).await,
        Command::Previous => control::run(controller, CoreCommand::PreviousTrack, global).await,
        Command::Sleep(args) => {
            let cmd = CoreCommand::SetSleepTimer {
                minutes: args.minutes,
            };
            control::run(controller, cmd, global).await
        }
        Command::Eq(args) => {
            let cmd = CoreCommand::SetEqPreset { index: args.index };
            control::run(controller, cmd, global).await
        }

        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a radio connection".into(),
        )),
    }
}
