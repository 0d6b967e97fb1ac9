//! Polling controller and domain model for Frontier Silicon radios.
//!
//! Sits between `frontier-api` (raw FSAPI protocol) and consumers such as
//! the `frontier` CLI:
//!
//! - **[`Controller`]**: owns the FSAPI client for one device. [`connect()`](Controller::connect)
//!   loads the mode and preset tables, publishes a first [`Snapshot`], then
//!   spawns the periodic poll and the command processor.
//!   [`Controller::oneshot()`] runs a single request/response cycle for CLI use.
//!
//! - **[`Snapshot`]**: what one poll cycle observed. Replaced whole on every
//!   cycle and handed out behind an `Arc`.
//!
//! - **[`Command`]**: typed device writes routed through an `mpsc` channel to
//!   the command processor. Each successful write triggers a refresh.
//!
//! - **Domain model** ([`model`]): modes, presets, the preset catalog, and the
//!   conversions that turn raw node values into display values.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::ControllerConfig;
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use store::DeviceStore;

pub use model::{
    CatalogEntry, Mode, NetworkInfo, NowPlaying, PlayStatus, PlayerState, PoweredState, Preset,
    PresetCatalog, Snapshot,
};

// Protocol-level types consumers commonly need.
pub use frontier_api::{DeviceInfo, Status};
