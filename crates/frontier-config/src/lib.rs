//! Shared configuration for the Frontier radio tools.
//!
//! TOML profiles, PIN resolution (env + keyring + plaintext), and
//! translation to `frontier_core::ControllerConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use frontier_core::ControllerConfig;
use frontier_core::config::{DEFAULT_PIN, DEFAULT_PRESET_MODES, DEFAULT_UNNAMED_PRESET_LABELS};

/// Keyring service name; entries are keyed `<profile>/pin`.
pub const KEYRING_SERVICE: &str = "frontier";

/// Environment variable consulted for the PIN when a profile names none.
pub const PIN_ENV: &str = "FRONTIER_PIN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named radio profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between polls for long-running commands (`watch`).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_poll_interval() -> u64 {
    30
}

/// A named radio profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP address of the radio.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// PIN (plaintext -- prefer keyring or env var).
    pub pin: Option<String>,

    /// Environment variable name containing the PIN.
    pub pin_env: Option<String>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override poll interval (seconds).
    pub poll_interval: Option<u64>,

    /// Mode keys whose presets are cached.
    pub preset_modes: Option<Vec<String>>,

    /// Preset names treated as empty slots.
    pub unnamed_preset_labels: Option<Vec<String>>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            pin: None,
            pin_env: None,
            timeout: None,
            poll_interval: None,
            preset_modes: None,
            unnamed_preset_labels: None,
        }
    }
}

fn default_port() -> u16 {
    80
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "frontier", "frontier").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("frontier");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
///
/// Environment overrides use `FRONTIER_` with `__` between levels, e.g.
/// `FRONTIER_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FRONTIER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is
/// unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── PIN resolution ──────────────────────────────────────────────────

/// Resolve the device PIN without CLI flags.
///
/// Order: the profile's `pin_env` variable, `FRONTIER_PIN`, the system
/// keyring, the plaintext `pin`, and finally the factory default.
pub fn resolve_pin(profile: &Profile, profile_name: &str) -> SecretString {
    if let Some(ref env_name) = profile.pin_env {
        if let Ok(val) = std::env::var(env_name) {
            return SecretString::from(val);
        }
    }

    if let Ok(val) = std::env::var(PIN_ENV) {
        return SecretString::from(val);
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(pin) = entry.get_password() {
            return SecretString::from(pin);
        }
    }

    if let Some(ref pin) = profile.pin {
        return SecretString::from(pin.clone());
    }

    SecretString::from(DEFAULT_PIN.to_owned())
}

/// Store a PIN in the system keyring for `profile_name`.
pub fn store_pin(profile_name: &str, pin: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(pin)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/pin")
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = ControllerConfig::new(host);
    config.port = profile.port;
    config.pin = resolve_pin(profile, profile_name);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout).max(1));
    config.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    config.preset_modes = profile.preset_modes.clone().unwrap_or_else(|| {
        DEFAULT_PRESET_MODES
            .iter()
            .map(|m| (*m).to_owned())
            .collect()
    });
    config.unnamed_preset_labels = profile.unnamed_preset_labels.clone().unwrap_or_else(|| {
        DEFAULT_UNNAMED_PRESET_LABELS
            .iter()
            .map(|l| (*l).to_owned())
            .collect()
    });
    Ok(config)
}
