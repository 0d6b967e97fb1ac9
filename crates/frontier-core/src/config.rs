// ── Runtime connection configuration ──
//
// Describes *how* to reach one radio and how often to poll it. Carries
// the PIN but never touches disk; the CLI builds a `ControllerConfig`
// from its profile and hands it in.

use std::time::Duration;

use frontier_api::{DeviceAddress, SettleDelays, TransportConfig};
use secrecy::SecretString;

/// PIN printed in most Frontier Silicon manuals.
pub const DEFAULT_PIN: &str = "1234";

/// Volume scale assumed when the device does not report its own.
pub const DEFAULT_VOLUME_STEPS: u32 = 32;

/// Modes whose presets are loaded at connect time: internet radio, DAB
/// and FM on most firmwares.
pub const DEFAULT_PRESET_MODES: &[&str] = &["0", "3", "4"];

/// Preset names treated as empty slots.
pub const DEFAULT_UNNAMED_PRESET_LABELS: &[&str] = &["unnamed"];

/// Configuration for one device connection.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub host: String,
    pub port: u16,
    pub pin: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Delay between polls. Zero disables the background poll.
    pub poll_interval: Duration,
    pub settle: SettleDelays,
    /// Modes whose presets are cached at connect time.
    pub preset_modes: Vec<String>,
    /// Load presets during `connect`. Switching modes to do so is audible
    /// on the device, so one-shot callers usually skip it.
    pub preload_presets: bool,
    /// Preset names (case-insensitive, trimmed) excluded from the catalog.
    pub unnamed_preset_labels: Vec<String>,
}

impl ControllerConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DeviceAddress::DEFAULT_PORT,
            pin: DEFAULT_PIN.to_owned().into(),
            timeout: TransportConfig::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            settle: SettleDelays::default(),
            preset_modes: DEFAULT_PRESET_MODES.iter().map(|m| (*m).to_owned()).collect(),
            preload_presets: true,
            unnamed_preset_labels: DEFAULT_UNNAMED_PRESET_LABELS
                .iter()
                .map(|l| (*l).to_owned())
                .collect(),
        }
    }

    pub fn address(&self) -> DeviceAddress {
        DeviceAddress::new(self.host.clone(), self.port)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }
}
