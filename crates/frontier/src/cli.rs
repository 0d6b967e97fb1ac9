//! Clap derive structures for the `frontier` CLI.

use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// frontier -- control Frontier Silicon internet radios over FSAPI
#[derive(Debug, Parser)]
#[command(
    name = "frontier",
    version,
    about = "Control Frontier Silicon internet radios from the command line",
    long_about = "Reads and drives Frontier Silicon based radios (Roberts, Hama, Medion,\n\
        Revo and others) through their local FSAPI HTTP interface.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Radio profile to use
    #[arg(long, short = 'p', env = "FRONTIER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Radio hostname or IP address (overrides profile)
    #[arg(long, short = 'H', env = "FRONTIER_HOST", global = true)]
    pub host: Option<String>,

    /// Radio HTTP port (overrides profile)
    #[arg(long, env = "FRONTIER_PORT", global = true)]
    pub port: Option<u16>,

    /// Device PIN (overrides profile and keyring)
    #[arg(long, global = true)]
    pub pin: Option<String>,

    /// Output format [default: `defaults.output` from the config, else table]
    #[arg(
        long = "output",
        short = 'o',
        env = "FRONTIER_OUTPUT",
        value_name = "FORMAT",
        global = true
    )]
    pub output_flag: Option<OutputFormat>,

    /// Effective output format, filled in from the flag or the config.
    #[arg(skip)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FRONTIER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what the radio is doing right now
    #[command(alias = "st")]
    Status,

    /// Poll the radio and print each new state
    Watch(WatchArgs),

    /// Show the radio's name, firmware, and ID
    Info,

    /// List input modes (sources)
    #[command(alias = "sources")]
    Modes,

    /// List named presets across cached modes
    Presets(PresetsArgs),

    /// Switch the radio on or off
    Power(PowerArgs),

    /// Set or nudge the volume
    #[command(alias = "vol")]
    Volume(VolumeArgs),

    /// Mute audio
    Mute,

    /// Unmute audio
    Unmute,

    /// Switch input mode by key or name
    #[command(alias = "source")]
    Mode(ModeArgs),

    /// Recall a preset by slot key or name
    Preset(PresetArgs),

    /// Resume playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Skip to the next track or station
    Next,

    /// Go back to the previous track or station
    #[command(alias = "prev")]
    Previous,

    /// Arm the sleep timer (0 cancels)
    Sleep(SleepArgs),

    /// Select an equaliser preset
    Eq(EqArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Read commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct PresetsArgs {
    /// List only the presets stored under this mode key
    #[arg(long, short = 'm')]
    pub mode: Option<String>,
}

// ── Write commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PowerArgs {
    pub state: PowerState,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct VolumeArgs {
    /// Absolute step, or `up` / `down`
    #[arg(
        value_parser = parse_volume_target,
        required_unless_present = "percent",
        conflicts_with = "percent"
    )]
    pub target: Option<VolumeTarget>,

    /// Volume as a percentage of the radio's scale
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub percent: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTarget {
    Step(u32),
    Up,
    Down,
}

impl FromStr for VolumeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "+" => Ok(Self::Up),
            "down" | "-" => Ok(Self::Down),
            other => other
                .parse()
                .map(Self::Step)
                .map_err(|_| format!("expected a step number, 'up' or 'down', got '{s}'")),
        }
    }
}

fn parse_volume_target(s: &str) -> Result<VolumeTarget, String> {
    s.parse()
}

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// Mode key (`4`) or display name (`FM`)
    pub mode: String,
}

#[derive(Debug, Args)]
pub struct PresetArgs {
    /// Slot key, catalog name (`[FM] Classic`), or bare preset name
    pub preset: String,

    /// Mode key the slot belongs to (switches mode first)
    #[arg(long, short = 'm')]
    pub mode: Option<String>,
}

#[derive(Debug, Args)]
pub struct SleepArgs {
    /// Minutes until standby
    pub minutes: u32,
}

#[derive(Debug, Args)]
pub struct EqArgs {
    /// Equaliser preset index
    pub index: u32,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set up a profile, checking the radio answers before saving
    ///
    /// With `--host` nothing is prompted for; the port and PIN come from
    /// `--port` and `--pin` or their defaults.
    Init(InitArgs),

    /// Display current configuration (PINs masked)
    Show,

    /// Store the active profile's PIN in the system keyring
    SetPin {
        /// PIN to store; prompted for when omitted
        value: Option<String>,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Profile name [default: prompted for, or `default` with --host]
    #[arg(long)]
    pub name: Option<String>,

    /// Save without contacting the radio
    #[arg(long)]
    pub no_verify: bool,

    /// Keep a non-default PIN in the config file instead of the keyring
    #[arg(long)]
    pub plaintext_pin: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
