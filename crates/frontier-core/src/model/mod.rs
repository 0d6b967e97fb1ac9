// ── Domain model ──
//
// What a poll cycle observed, plus the mode and preset tables cached
// alongside it. Raw FSAPI node values come in as strings; conversion to
// display values lives next to the types that carry them.

pub mod media;
pub mod network;
pub mod snapshot;
pub mod source;

pub use media::NowPlaying;
pub use network::NetworkInfo;
pub use snapshot::{PlayStatus, PlayerState, PoweredState, Snapshot};
pub use source::{
    CatalogEntry, Mode, Preset, PresetCatalog, mode_display_name, mode_fallback_key,
    mode_fallback_name,
};
