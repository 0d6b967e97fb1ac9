// ── Command API ──
//
// All device writes flow through a unified `Command` enum. The controller
// routes each variant to the matching FSAPI write and refreshes the
// snapshot when the device accepts it.

use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<(), CoreError>>,
}

/// Every write operation against a radio.
#[derive(Debug, Clone, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    // ── Power ────────────────────────────────────────────────────────
    PowerOn,
    PowerOff,

    // ── Volume ───────────────────────────────────────────────────────
    /// Absolute step on the device's own scale.
    SetVolume { step: u32 },
    /// Fraction `0.0..=1.0` of the device's scale.
    SetVolumeLevel { level: f64 },
    VolumeUp,
    VolumeDown,
    Mute,
    Unmute,

    // ── Sources ──────────────────────────────────────────────────────
    /// Mode by list key.
    SelectMode { mode: String },
    /// Mode by display name.
    SelectSource { name: String },
    /// Preset by slot key, in `mode` or the active one.
    SelectPreset { mode: Option<String>, key: String },
    /// Preset by catalog display name (`[FM] Classic`) or bare name.
    SelectCatalogPreset { name: String },

    // ── Transport ────────────────────────────────────────────────────
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,

    // ── Settings ─────────────────────────────────────────────────────
    /// Zero cancels the timer.
    SetSleepTimer { minutes: u32 },
    SetEqPreset { index: u32 },

    // ── Cache maintenance ────────────────────────────────────────────
    RefreshPresets,
    RefreshModes,
}

impl Command {
    /// Whether the command writes to the device, as opposed to reloading
    /// cached tables.
    pub fn is_device_write(&self) -> bool {
        !matches!(self, Self::RefreshPresets | Self::RefreshModes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_variant_only() {
        assert_eq!(Command::PowerOn.to_string(), "power_on");
        assert_eq!(Command::SetVolume { step: 3 }.to_string(), "set_volume");
        assert_eq!(
            Command::SelectPreset {
                mode: None,
                key: "1".into()
            }
            .to_string(),
            "select_preset"
        );
        assert!(!Command::RefreshModes.is_device_write());
        assert!(Command::Mute.is_device_write());
    }
}
