//! Read-only views: status, watch, info.

use chrono::Local;
use tokio::sync::watch;

use frontier_core::model::mode_display_name;
use frontier_core::{Controller, DeviceInfo, Mode, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

// ── Formatting ──────────────────────────────────────────────────────

fn yes_no(flag: bool) -> String {
    String::from(if flag { "yes" } else { "no" })
}

/// Multi-line detail view of a snapshot.
pub(super) fn format_status(snapshot: &Snapshot, modes: &[Mode]) -> String {
    let Some(state) = snapshot.state() else {
        let power = if snapshot.is_available() {
            "standby"
        } else {
            "unreachable"
        };
        return output::detail_lines(&[("Power", Some(power.into()))]);
    };

    let playing = &state.now_playing;
    let network = &state.network;
    output::detail_lines(&[
        ("Power", Some("on".into())),
        ("State", Some(snapshot.player_state().to_string())),
        (
            "Mode",
            state.mode.as_deref().map(|m| mode_display_name(modes, m)),
        ),
        ("Station", playing.title().map(str::to_owned)),
        ("Artist", playing.media_artist().map(str::to_owned)),
        ("Album", playing.album.clone()),
        (
            "Volume",
            Some(format!(
                "{}/{} ({}%)",
                state.volume,
                state.volume_steps,
                state.volume_percent()
            )),
        ),
        ("Muted", Some(yes_no(state.mute))),
        (
            "Sleep",
            (state.sleep_remaining_secs > 0)
                .then(|| format!("{} (~{} min)", state.sleep_formatted(), state.sleep_minutes())),
        ),
        ("EQ", state.eq_preset.clone()),
        (
            "Signal",
            network.rssi_dbm().map(|dbm| match network.wifi_ssid.as_deref() {
                Some(ssid) => format!("{dbm} dBm ({ssid})"),
                None => format!("{dbm} dBm"),
            }),
        ),
        ("IP", network.ipv4().map(|ip| ip.to_string())),
        ("MAC", network.mac_address.clone()),
    ])
}

/// One-line summary used by `watch` and write confirmations.
pub(super) fn summary_line(snapshot: &Snapshot, modes: &[Mode]) -> String {
    let Some(state) = snapshot.state() else {
        return if snapshot.is_available() {
            "standby".into()
        } else {
            "unreachable".into()
        };
    };

    let mut parts = vec![snapshot.player_state().to_string()];
    if let Some(mode) = state.mode.as_deref() {
        parts.push(mode_display_name(modes, mode));
    }
    if let Some(title) = state.now_playing.title() {
        parts.push(title.to_owned());
    }
    let volume = if state.mute {
        "muted".to_owned()
    } else {
        format!("vol {}%", state.volume_percent())
    };
    parts.push(volume);
    if state.sleep_remaining_secs > 0 {
        parts.push(format!("sleep {}m", state.sleep_minutes()));
    }
    parts.join(" · ")
}

fn format_info(info: &DeviceInfo) -> String {
    output::detail_lines(&[
        ("Name", info.friendly_name.clone()),
        ("Firmware", info.version.clone()),
        ("Radio ID", info.radio_id.clone()),
    ])
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller.snapshot();
    let modes = if snapshot.is_powered() {
        controller.modes().await
    } else {
        controller.store().modes()
    };
    let out = output::render_single(
        &global.output,
        &*snapshot,
        |s| format_status(s, &modes),
        plain_status,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Player state, then (when on) the volume as a `0.00..=1.00` level and
/// the station, one per line.
fn plain_status(snapshot: &Snapshot) -> String {
    let mut lines = vec![snapshot.player_state().to_string()];
    if let Some(state) = snapshot.state() {
        lines.push(format!("{:.2}", state.volume_level()));
        lines.extend(state.now_playing.title().map(str::to_owned));
    }
    lines.join("\n")
}

pub async fn info(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let info = controller.device_info();
    if *info == DeviceInfo::default() && !controller.snapshot().is_available() {
        return Err(CliError::Unreachable {
            address: controller.config().address().to_string(),
        });
    }
    let out = output::render_single(&global.output, &*info, format_info, |i| {
        i.friendly_name.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Print each published snapshot until interrupted or `--count` is reached.
pub async fn watch(
    controller: &Controller,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut rx = controller.subscribe();
    let modes = controller.modes().await;
    let mut printed = 0usize;

    loop {
        let snapshot = rx.borrow_and_update().clone();
        print_watch_entry(&snapshot, &modes, global)?;
        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            return Ok(());
        }

        if !next_update(&mut rx).await {
            return Ok(());
        }
    }
}

/// Wait for the next snapshot. `false` on Ctrl-C or a closed channel.
async fn next_update(rx: &mut watch::Receiver<std::sync::Arc<Snapshot>>) -> bool {
    tokio::select! {
        changed = rx.changed() => changed.is_ok(),
        _ = tokio::signal::ctrl_c() => false,
    }
}

fn print_watch_entry(
    snapshot: &Snapshot,
    modes: &[Mode],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => format!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            summary_line(snapshot, modes)
        ),
        // One document per line so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(snapshot, true)?,
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(snapshot)?.trim_end()),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use frontier_core::{NowPlaying, PlayStatus, PoweredState};

    use super::*;

    fn playing() -> Snapshot {
        Snapshot::powered(PoweredState {
            volume: 16,
            volume_steps: 32,
            mode: Some("4".into()),
            play_status: PlayStatus::Playing,
            now_playing: NowPlaying {
                station_name: Some("Classic FM".into()),
                ..NowPlaying::default()
            },
            ..PoweredState::default()
        })
    }

    #[test]
    fn summary_uses_fallback_mode_names() {
        assert_eq!(
            summary_line(&playing(), &[]),
            "playing · FM · Classic FM · vol 50%"
        );
        assert_eq!(summary_line(&Snapshot::standby(), &[]), "standby");
        assert_eq!(summary_line(&Snapshot::unavailable(), &[]), "unreachable");
    }

    #[test]
    fn sleep_timer_shows_rounded_minutes() {
        let Some(state) = playing().state().cloned() else {
            panic!("expected a powered snapshot");
        };
        let snapshot = Snapshot::powered(PoweredState {
            sleep_remaining_secs: 750,
            ..state
        });
        assert!(summary_line(&snapshot, &[]).ends_with("vol 50% · sleep 12m"));
        assert!(format_status(&snapshot, &[]).contains("Sleep    12:30 (~12 min)"));
    }

    #[test]
    fn plain_status_carries_volume_level() {
        assert_eq!(plain_status(&playing()), "playing\n0.50\nClassic FM");
        assert_eq!(plain_status(&Snapshot::standby()), "off");
    }

    #[test]
    fn status_detail_lists_powered_fields() {
        let text = format_status(&playing(), &[]);
        assert!(text.contains("Volume   16/32 (50%)"), "{text}");
        assert!(text.contains("Station  Classic FM"), "{text}");
        assert!(!text.contains("Sleep"), "{text}");
    }
}
