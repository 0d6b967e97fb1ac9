// ── Poll snapshot ──
//
// One poll cycle's view of the device. Built whole by the controller and
// never mutated after publication.

use serde::Serialize;

use super::media::NowPlaying;
use super::network::NetworkInfo;
use crate::config::DEFAULT_VOLUME_STEPS;

/// Result of one poll cycle.
///
/// Serializes flat: `{"available": false, "power": false}` when the device
/// is offline or in standby, with the powered fields merged in otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    available: bool,
    power: bool,
    #[serde(flatten)]
    state: Option<PoweredState>,
}

impl Snapshot {
    /// The device did not answer, or answered with nothing usable.
    pub const fn unavailable() -> Self {
        Self {
            available: false,
            power: false,
            state: None,
        }
    }

    /// Reachable but switched off.
    pub const fn standby() -> Self {
        Self {
            available: true,
            power: false,
            state: None,
        }
    }

    pub const fn powered(state: PoweredState) -> Self {
        Self {
            available: true,
            power: true,
            state: Some(state),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_powered(&self) -> bool {
        self.power
    }

    /// Secondary fields; `None` unless the device is powered.
    pub fn state(&self) -> Option<&PoweredState> {
        self.state.as_ref()
    }

    pub fn player_state(&self) -> PlayerState {
        match &self.state {
            None => PlayerState::Off,
            Some(state) => match state.play_status {
                PlayStatus::Playing => PlayerState::Playing,
                PlayStatus::Paused => PlayerState::Paused,
                PlayStatus::Buffering => PlayerState::Buffering,
                PlayStatus::Stopped | PlayStatus::Unknown => PlayerState::Idle,
            },
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Fields read only while the device is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoweredState {
    pub volume: u32,
    pub volume_steps: u32,
    pub mute: bool,
    /// Key of the active mode.
    pub mode: Option<String>,
    pub play_status: PlayStatus,
    #[serde(flatten)]
    pub now_playing: NowPlaying,
    #[serde(flatten)]
    pub network: NetworkInfo,
    /// Remaining sleep time in seconds; zero when no timer is armed.
    #[serde(rename = "sleep_timer")]
    pub sleep_remaining_secs: u32,
    pub eq_preset: Option<String>,
}

impl PoweredState {
    pub fn volume_percent(&self) -> u32 {
        volume_percent(self.volume, self.volume_steps)
    }

    pub fn volume_level(&self) -> f64 {
        volume_level(self.volume, self.volume_steps)
    }

    pub fn sleep_minutes(&self) -> u32 {
        div_round_half_even(self.sleep_remaining_secs, 60)
    }

    /// Remaining sleep time as `m:ss`.
    pub fn sleep_formatted(&self) -> String {
        format!(
            "{}:{:02}",
            self.sleep_remaining_secs / 60,
            self.sleep_remaining_secs % 60
        )
    }
}

impl Default for PoweredState {
    fn default() -> Self {
        Self {
            volume: 0,
            volume_steps: DEFAULT_VOLUME_STEPS,
            mute: false,
            mode: None,
            play_status: PlayStatus::Unknown,
            now_playing: NowPlaying::default(),
            network: NetworkInfo::default(),
            sleep_remaining_secs: 0,
            eq_preset: None,
        }
    }
}

// ── Play status ─────────────────────────────────────────────────────

/// `netRemote.play.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    Stopped,
    Buffering,
    Playing,
    Paused,
    Unknown,
}

impl PlayStatus {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("0") => Self::Stopped,
            Some("1") => Self::Buffering,
            Some("2") => Self::Playing,
            Some("3") => Self::Paused,
            _ => Self::Unknown,
        }
    }
}

/// Coarse player state for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerState {
    Off,
    Idle,
    Buffering,
    Playing,
    Paused,
}

// ── Volume ──────────────────────────────────────────────────────────

/// `volume` as a percentage of `steps`, rounded half to even.
pub fn volume_percent(volume: u32, steps: u32) -> u32 {
    if steps == 0 {
        return 0;
    }
    div_round_half_even(volume.saturating_mul(100), steps)
}

/// `volume` as a fraction of `steps`.
pub fn volume_level(volume: u32, steps: u32) -> f64 {
    if steps == 0 {
        return 0.0;
    }
    f64::from(volume) / f64::from(steps)
}

/// Absolute step for a `0.0..=1.0` level. Truncates, then clamps to
/// `0..=steps`.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn step_for_level(level: f64, steps: u32) -> u32 {
    if level.is_nan() {
        return 0;
    }
    let max = f64::from(steps);
    (level * max).trunc().clamp(0.0, max) as u32
}

fn div_round_half_even(numerator: u32, denominator: u32) -> u32 {
    let quotient = numerator / denominator;
    let twice_rem = u64::from(numerator % denominator) * 2;
    let denominator = u64::from(denominator);
    if twice_rem > denominator || (twice_rem == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}
