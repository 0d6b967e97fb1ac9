// Shared transport configuration for building reqwest::Client instances,
// plus the settle delays the radio needs between dependent writes.

use std::time::Duration;

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Radios in deep standby often never answer.
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("frontier/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Pauses the firmware needs before a follow-up request sees the effect
/// of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After writing `netRemote.sys.mode`.
    pub mode_switch: Duration,
    /// After entering navigation state, before listing presets.
    pub navigation: Duration,
}

impl SettleDelays {
    /// No waiting at all. Used against mock servers.
    pub const fn none() -> Self {
        Self {
            mode_switch: Duration::ZERO,
            navigation: Duration::ZERO,
        }
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            mode_switch: Duration::from_millis(500),
            navigation: Duration::from_millis(300),
        }
    }
}
