// Device operations
//
// Thin wrappers over `get_value` / `set_value` / `list_get_next` for the
// nodes a controller actually needs. Writes return `true` only on FS_OK.

use serde::Serialize;
use tracing::debug;

use crate::client::{FsapiClient, ListItem};

/// FSAPI node paths.
pub mod nodes {
    pub const POWER: &str = "netRemote.sys.power";
    pub const MODE: &str = "netRemote.sys.mode";
    pub const VALID_MODES: &str = "netRemote.sys.caps.validModes";
    pub const VOLUME_STEPS: &str = "netRemote.sys.caps.volumeSteps";
    pub const VOLUME: &str = "netRemote.sys.audio.volume";
    pub const MUTE: &str = "netRemote.sys.audio.mute";
    pub const EQ_PRESET: &str = "netRemote.sys.audio.eqPreset";
    pub const SLEEP: &str = "netRemote.sys.sleep";

    pub const FRIENDLY_NAME: &str = "netRemote.sys.info.friendlyName";
    pub const VERSION: &str = "netRemote.sys.info.version";
    pub const RADIO_ID: &str = "netRemote.sys.info.radioId";

    pub const PLAY_CONTROL: &str = "netRemote.play.control";
    pub const PLAY_STATUS: &str = "netRemote.play.status";
    pub const PLAY_NAME: &str = "netRemote.play.info.name";
    pub const PLAY_TEXT: &str = "netRemote.play.info.text";
    pub const PLAY_ARTIST: &str = "netRemote.play.info.artist";
    pub const PLAY_ALBUM: &str = "netRemote.play.info.album";
    pub const PLAY_GRAPHIC: &str = "netRemote.play.info.graphicUri";

    pub const NAV_STATE: &str = "netRemote.nav.state";
    pub const PRESETS: &str = "netRemote.nav.presets";
    pub const SELECT_PRESET: &str = "netRemote.nav.action.selectPreset";

    pub const WLAN_RSSI: &str = "netRemote.sys.net.wlan.rssi";
    pub const WLAN_SSID: &str = "netRemote.sys.net.wlan.connectedSSID";
    pub const WLAN_MAC: &str = "netRemote.sys.net.wlan.macAddress";
    pub const IP_ADDRESS: &str = "netRemote.sys.net.ipConfig.address";
}

/// Maximum entries requested from list nodes by default.
pub const DEFAULT_LIST_MAX_ITEMS: u32 = 100;

/// Presets are capped lower; the firmware has at most 40 slots per mode.
pub const PRESET_LIST_MAX_ITEMS: u32 = 40;

/// Transport actions written to `netRemote.play.control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayControl {
    Stop,
    Play,
    Pause,
    Next,
    Previous,
}

impl PlayControl {
    pub fn code(self) -> &'static str {
        match self {
            Self::Stop => "0",
            Self::Play => "1",
            Self::Pause => "2",
            Self::Next => "3",
            Self::Previous => "4",
        }
    }
}

/// Identity nodes read once per connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub friendly_name: Option<String>,
    pub version: Option<String>,
    pub radio_id: Option<String>,
}

impl FsapiClient {
    pub async fn device_info(&self) -> DeviceInfo {
        let (name, version, radio_id) = tokio::join!(
            self.get_value(nodes::FRIENDLY_NAME),
            self.get_value(nodes::VERSION),
            self.get_value(nodes::RADIO_ID),
        );
        DeviceInfo {
            friendly_name: name.value,
            version: version.value,
            radio_id: radio_id.value,
        }
    }

    /// Operating modes the device offers (`netRemote.sys.caps.validModes`).
    pub async fn modes(&self) -> Vec<ListItem> {
        self.list_get_next(nodes::VALID_MODES, DEFAULT_LIST_MAX_ITEMS)
            .await
    }

    /// Presets of the active mode.
    ///
    /// The preset list only populates once the device is in navigation
    /// state, so this enters it first and waits for the firmware to
    /// settle.
    pub async fn presets(&self) -> Vec<ListItem> {
        let status = self.set_value(nodes::NAV_STATE, "1").await;
        if !status.is_ok() {
            debug!(%status, "entering navigation state failed, reading presets anyway");
        }
        tokio::time::sleep(self.settle().navigation).await;
        self.list_get_next(nodes::PRESETS, PRESET_LIST_MAX_ITEMS)
            .await
    }

    /// Presets of `mode`, switching the device into it first.
    ///
    /// Leaves the device in `mode`. When the mode write is rejected the
    /// presets of whatever mode is active are returned.
    pub async fn presets_for_mode(&self, mode: &str) -> Vec<ListItem> {
        let current = self.get_value(nodes::MODE).await;
        if current.as_str() != Some(mode) {
            let status = self.set_value(nodes::MODE, mode).await;
            if !status.is_ok() {
                debug!(mode, %status, "mode switch for preset read rejected");
            }
            tokio::time::sleep(self.settle().mode_switch).await;
        }
        self.presets().await
    }

    // ── Writes ──────────────────────────────────────────────────────

    pub async fn power_on(&self) -> bool {
        self.set_value(nodes::POWER, "1").await.is_ok()
    }

    pub async fn power_off(&self) -> bool {
        self.set_value(nodes::POWER, "0").await.is_ok()
    }

    /// Set the absolute volume step.
    pub async fn set_volume(&self, step: u32) -> bool {
        self.set_value(nodes::VOLUME, &step.to_string())
            .await
            .is_ok()
    }

    pub async fn mute(&self) -> bool {
        self.set_value(nodes::MUTE, "1").await.is_ok()
    }

    pub async fn unmute(&self) -> bool {
        self.set_value(nodes::MUTE, "0").await.is_ok()
    }

    pub async fn set_mode(&self, mode: &str) -> bool {
        self.set_value(nodes::MODE, mode).await.is_ok()
    }

    /// Select a preset of the active mode by its list key.
    pub async fn select_preset(&self, key: &str) -> bool {
        self.set_value(nodes::SELECT_PRESET, key).await.is_ok()
    }

    /// Switch to `mode` if needed, then select preset `key`.
    pub async fn select_preset_in_mode(&self, mode: &str, key: &str) -> bool {
        let current = self.get_value(nodes::MODE).await;
        if current.as_str() != Some(mode) {
            if !self.set_mode(mode).await {
                return false;
            }
            tokio::time::sleep(self.settle().mode_switch).await;
        }
        // Selecting only works from navigation state.
        let status = self.set_value(nodes::NAV_STATE, "1").await;
        if !status.is_ok() {
            debug!(%status, mode, "entering navigation state failed, selecting anyway");
        }
        tokio::time::sleep(self.settle().navigation).await;
        self.select_preset(key).await
    }

    pub async fn play_control(&self, action: PlayControl) -> bool {
        self.set_value(nodes::PLAY_CONTROL, action.code())
            .await
            .is_ok()
    }

    pub async fn play(&self) -> bool {
        self.play_control(PlayControl::Play).await
    }

    pub async fn pause(&self) -> bool {
        self.play_control(PlayControl::Pause).await
    }

    pub async fn stop(&self) -> bool {
        self.play_control(PlayControl::Stop).await
    }

    pub async fn next_track(&self) -> bool {
        self.play_control(PlayControl::Next).await
    }

    pub async fn previous_track(&self) -> bool {
        self.play_control(PlayControl::Previous).await
    }

    /// Arm the sleep timer for `minutes`; zero cancels it. The node itself
    /// counts seconds.
    pub async fn set_sleep_timer(&self, minutes: u32) -> bool {
        let seconds = minutes.saturating_mul(60);
        self.set_value(nodes::SLEEP, &seconds.to_string())
            .await
            .is_ok()
    }

    pub async fn set_eq_preset(&self, index: u32) -> bool {
        self.set_value(nodes::EQ_PRESET, &index.to_string())
            .await
            .is_ok()
    }
}
