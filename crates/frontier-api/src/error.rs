use thiserror::Error;

/// Top-level error type for the `frontier-api` crate.
///
/// These never escape the protocol operations themselves (those degrade
/// to statuses and empty values); they surface from construction and
/// from the internal request path, where they decide how loudly a failed
/// request gets logged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Device replies ──────────────────────────────────────────────
    /// The device answered with something other than HTTP 200.
    #[error("Device returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The device answered 200 with an empty body.
    #[error("Device returned an empty body")]
    EmptyBody,

    // ── Addressing ──────────────────────────────────────────────────
    /// Host string cannot be used in a device URL.
    #[error("Invalid device host: {host:?}")]
    InvalidHost { host: String },
}

impl Error {
    /// Returns `true` for the failures a flaky or sleeping radio produces
    /// routinely. These are logged quietly; everything else is loud.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder(),
            Self::HttpStatus { .. } | Self::EmptyBody => true,
            Self::InvalidUrl(_) | Self::ClientBuild(_) | Self::InvalidHost { .. } => false,
        }
    }

    /// Returns `true` if the request never got an answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
