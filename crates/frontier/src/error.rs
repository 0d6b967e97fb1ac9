//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use frontier_config::ConfigError;
use frontier_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Radio at {address} is not answering")]
    #[diagnostic(
        code(frontier::unreachable),
        help(
            "Check that the radio is on the network and the PIN is right.\n\
             The factory PIN is 1234; set yours with: frontier config set-pin"
        )
    )]
    Unreachable { address: String },

    #[error("Lost the connection to the radio")]
    #[diagnostic(code(frontier::disconnected))]
    Disconnected,

    // ── Device ───────────────────────────────────────────────────────
    #[error("The radio rejected '{command}'")]
    #[diagnostic(
        code(frontier::rejected),
        help("The radio may be in standby or the value may be out of range for this model.")
    )]
    Rejected { command: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(frontier::not_found),
        help("Run: frontier {list_command} to see what this radio offers")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(frontier::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(frontier::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: frontier config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No radio configured")]
    #[diagnostic(
        code(frontier::no_config),
        help(
            "Pass --host, set FRONTIER_HOST, or create a profile with: frontier config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(frontier::config))]
    Config(Box<ConfigError>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(frontier::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode output as JSON: {0}")]
    #[diagnostic(code(frontier::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not encode output as YAML: {0}")]
    #[diagnostic(code(frontier::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::Disconnected => exit_code::CONNECTION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { address, reason: _ } => CliError::Unreachable { address },
            CoreError::ControllerDisconnected => CliError::Disconnected,
            CoreError::Rejected { command } => CliError::Rejected { command },
            CoreError::SourceNotFound { name } => CliError::NotFound {
                resource_type: "Mode".into(),
                identifier: name,
                list_command: "modes".into(),
            },
            CoreError::PresetNotFound { name } => CliError::NotFound {
                resource_type: "Preset".into(),
                identifier: name,
                list_command: "presets".into(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let unreachable: CliError = CoreError::Unreachable {
            address: "radio.local".into(),
            reason: "timed out".into(),
        }
        .into();
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let rejected: CliError = CoreError::Rejected {
            command: "mute".into(),
        }
        .into();
        assert_eq!(rejected.exit_code(), exit_code::REJECTED);

        let missing: CliError = CoreError::SourceNotFound { name: "Tape".into() }.into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let invalid: CliError = CoreError::ValidationFailed {
            message: "step 40 exceeds 32".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
    }
}
