// ── Core error types ──
//
// User-facing errors from frontier-core. Protocol operations never fail
// outright; these cover lifecycle problems, lookups against the cached
// tables, and device writes that came back with something other than
// FS_OK.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Device at {address} did not answer: {reason}")]
    Unreachable { address: String, reason: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Source not found: {name}")]
    SourceNotFound { name: String },

    #[error("Preset not found: {name}")]
    PresetNotFound { name: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Device rejected {command}")]
    Rejected { command: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<frontier_api::Error> for CoreError {
    fn from(err: frontier_api::Error) -> Self {
        match err {
            frontier_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid device URL: {e}"),
            },
            frontier_api::Error::InvalidHost { host } => CoreError::Config {
                message: format!("Invalid device host: {host:?}"),
            },
            frontier_api::Error::ClientBuild(message) => CoreError::Internal(message),
            other @ (frontier_api::Error::Transport(_)
            | frontier_api::Error::HttpStatus { .. }
            | frontier_api::Error::EmptyBody) => CoreError::Unreachable {
                address: String::new(),
                reason: other.to_string(),
            },
        }
    }
}
