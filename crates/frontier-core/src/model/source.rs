// ── Modes and presets ──

use std::collections::BTreeMap;

use frontier_api::ListItem;
use serde::Serialize;

/// An input mode from `netRemote.sys.caps.validModes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mode {
    /// List key; this is what `netRemote.sys.mode` reads and writes.
    pub key: String,
    /// Firmware identifier such as `IR` or `DAB`.
    pub id: Option<String>,
    pub label: Option<String>,
    pub name: Option<String>,
    pub selectable: bool,
}

impl Mode {
    pub fn from_item(item: &ListItem) -> Self {
        Self {
            key: item.key.clone(),
            id: item.field("id").map(str::to_owned),
            label: item.field("label").map(str::to_owned),
            name: item.field("name").map(str::to_owned),
            // Missing means selectable; only older firmwares omit it.
            selectable: item.field("selectable").is_none_or(|s| s.trim() != "0"),
        }
    }

    /// Label, else name, else `Mode {key}`.
    pub fn display_name(&self) -> String {
        let nonblank = |n: &&str| !n.trim().is_empty();
        self.label
            .as_deref()
            .filter(nonblank)
            .or_else(|| self.name.as_deref().filter(nonblank))
            .map_or_else(|| format!("Mode {}", self.key), str::to_owned)
    }
}

/// Well-known mode keys, used when the device's own mode table has no entry.
const FALLBACK_MODE_NAMES: [(&str, &str); 7] = [
    ("0", "Radio"),
    ("1", "Spotify"),
    ("2", "Music"),
    ("3", "DAB+"),
    ("4", "FM"),
    ("5", "Bluetooth"),
    ("6", "AUX"),
];

/// Name for a mode key when the device's own mode table has no entry.
pub fn mode_fallback_name(key: &str) -> Option<&'static str> {
    FALLBACK_MODE_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
}

/// Reverse of [`mode_fallback_name`], case-insensitive.
pub fn mode_fallback_key(name: &str) -> Option<&'static str> {
    let name = name.trim();
    FALLBACK_MODE_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(key, _)| *key)
}

/// Name for `key`: the device's own mode entry, else the fallback table,
/// else `Mode {key}`.
pub fn mode_display_name(modes: &[Mode], key: &str) -> String {
    modes
        .iter()
        .find(|m| m.key == key)
        .map(Mode::display_name)
        .or_else(|| mode_fallback_name(key).map(str::to_owned))
        .unwrap_or_else(|| format!("Mode {key}"))
}

/// A stored favourite in one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Slot key, written to `netRemote.nav.action.selectPreset`.
    pub key: String,
    pub name: Option<String>,
}

impl Preset {
    pub fn from_item(item: &ListItem) -> Self {
        Self {
            key: item.key.clone(),
            name: item.field("name").map(str::to_owned),
        }
    }

    /// Whether this slot holds a real station. Empty names and names in
    /// `unnamed_labels` (case-insensitive, trimmed) do not.
    pub fn is_named(&self, unnamed_labels: &[String]) -> bool {
        let Some(name) = self.name.as_deref().map(str::trim) else {
            return false;
        };
        !name.is_empty()
            && !unnamed_labels
                .iter()
                .any(|label| label.trim().eq_ignore_ascii_case(name))
    }
}

/// One selectable preset across all cached modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// `[<mode name>] <preset name>`
    pub display: String,
    pub mode: String,
    pub key: String,
    pub name: String,
}

/// Named presets across modes, sorted by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PresetCatalog {
    entries: Vec<CatalogEntry>,
}

impl PresetCatalog {
    /// Build from the cached preset table. Mode names come from `modes`
    /// when the device lists the mode, else from the fallback table.
    pub fn build(
        presets: &BTreeMap<String, Vec<Preset>>,
        modes: &[Mode],
        unnamed_labels: &[String],
    ) -> Self {
        let mut entries: Vec<CatalogEntry> = presets
            .iter()
            .flat_map(|(mode_key, list)| {
                let mode_name = mode_display_name(modes, mode_key);
                list.iter()
                    .filter(move |p| p.is_named(unnamed_labels))
                    .filter_map(move |p| {
                        let name = p.name.as_deref()?.trim().to_owned();
                        Some(CatalogEntry {
                            display: format!("[{mode_name}] {name}"),
                            mode: mode_key.clone(),
                            key: p.key.clone(),
                            name,
                        })
                    })
            })
            .collect();
        entries.sort_by(|a, b| a.display.cmp(&b.display));
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up by display name, falling back to a unique bare preset name.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.display == name) {
            return Some(entry);
        }
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name.trim()));
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    /// The entry matching what is playing: same mode, and the display name
    /// contains the station name. A blank station matches nothing.
    pub fn current(&self, mode: &str, station_name: &str) -> Option<&CatalogEntry> {
        let station = station_name.trim();
        if station.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.mode == mode && e.display.contains(station))
    }
}
