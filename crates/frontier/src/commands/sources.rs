//! Mode and preset listings.

use tabled::Tabled;

use frontier_core::model::mode_display_name;
use frontier_core::{CatalogEntry, Controller, Mode, Preset, PresetCatalog, Snapshot};

use crate::cli::{GlobalOpts, PresetsArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ModeRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Selectable")]
    selectable: String,
}

fn mode_row(m: &Mode) -> ModeRow {
    ModeRow {
        key: m.key.clone(),
        name: m.display_name(),
        id: m.id.clone().unwrap_or_default(),
        selectable: if m.selectable { "yes" } else { "no" }.into(),
    }
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = " ")]
    active: String,
    #[tabled(rename = "Preset")]
    display: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Key")]
    key: String,
}

fn catalog_row(e: &CatalogEntry, active: Option<&CatalogEntry>) -> CatalogRow {
    CatalogRow {
        active: if active == Some(e) { "*" } else { "" }.into(),
        display: e.display.clone(),
        mode: e.mode.clone(),
        key: e.key.clone(),
    }
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
}

fn slot_row(p: &Preset) -> SlotRow {
    SlotRow {
        key: p.key.clone(),
        name: p.name.clone().unwrap_or_default(),
    }
}

/// The catalog entry for the station currently playing, if any.
fn active_preset<'a>(
    catalog: &'a PresetCatalog,
    snapshot: &Snapshot,
) -> Option<&'a CatalogEntry> {
    let state = snapshot.state()?;
    catalog.current(state.mode.as_deref()?, state.now_playing.title()?)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn modes(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let modes = controller.modes().await;
    if modes.is_empty() && !controller.snapshot().is_available() {
        return Err(CliError::Unreachable {
            address: controller.config().address().to_string(),
        });
    }
    let out = output::render_list(&global.output, modes.as_slice(), mode_row, |m| m.key.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Named presets across cached modes, or every slot of one mode with
/// `--mode`.
pub async fn presets(
    controller: &Controller,
    args: &PresetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref mode) = args.mode {
        let presets = controller.presets().await;
        let Some(slots) = presets.get(mode) else {
            let modes = controller.store().modes();
            return Err(CliError::NotFound {
                resource_type: "Preset list".into(),
                identifier: mode_display_name(&modes, mode),
                list_command: "presets".into(),
            });
        };
        let out = output::render_list(&global.output, slots, slot_row, |p| p.key.clone())?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    // Preset loading switches modes; take what is playing before it does.
    let snapshot = controller.snapshot();
    let catalog = controller.preset_catalog().await;
    let active = active_preset(&catalog, &snapshot);
    let out = output::render_list(
        &global.output,
        catalog.entries(),
        |e| catalog_row(e, active),
        |e| e.display.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
