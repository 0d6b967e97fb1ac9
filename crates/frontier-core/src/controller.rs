// ── Controller abstraction ──
//
// Full lifecycle management for one radio connection. Handles the FSAPI
// client, the mode/preset tables, background polling, command routing,
// and snapshot publication through the DeviceStore.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use frontier_api::endpoints::nodes;
use frontier_api::{DeviceInfo, FsapiClient};

use crate::command::{Command, CommandEnvelope};
use crate::config::{ControllerConfig, DEFAULT_VOLUME_STEPS};
use crate::error::CoreError;
use crate::model::snapshot::step_for_level;
use crate::model::source::mode_fallback_key;
use crate::model::{
    Mode, NetworkInfo, NowPlaying, PlayStatus, PoweredState, Preset, PresetCatalog, Snapshot,
};
use crate::store::DeviceStore;

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns one FSAPI client;
/// poll cycles and device writes take turns on it.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DeviceStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection: cancelled on shutdown,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<FsapiClient>>>,
    /// Held for the duration of a poll cycle, a device write, or a table
    /// reload. A session-expiry retry must not race another request.
    device_lock: Mutex<()>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to reach the device and start
    /// background tasks.
    pub fn new(config: ControllerConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DeviceStore::new()),
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                device_lock: Mutex::new(()),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying DeviceStore.
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the device.
    ///
    /// Builds the client, loads identity and the mode/preset tables when
    /// the device answers, publishes a first snapshot, then spawns the
    /// periodic poll and the command processor. An unreachable device is
    /// not an error: the snapshot says so and polling continues.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = FsapiClient::new(config.address(), config.pin.clone(), &config.transport());
        let client = match client {
            Ok(client) => Arc::new(client.with_settle_delays(config.settle)),
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(Arc::clone(&client));

        if client.ensure_session().await {
            self.inner.store.set_device_info(client.device_info().await);
            self.refresh_modes().await;
            if config.preload_presets {
                self.refresh_presets().await;
            }
        } else {
            warn!(device = %config.address(), "device not answering, tables will load on demand");
        }

        self.refresh().await;

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            let cancel = child.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx, cancel)));
        }

        if !config.poll_interval.is_zero() {
            let ctrl = self.clone();
            let cancel = child.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, config.poll_interval, cancel)));
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(device = %config.address(), "connected to radio");
        Ok(())
    }

    /// Stop background tasks, release the client, and reset the store.
    pub async fn shutdown(&self) {
        // Cancel the child token (not the parent -- allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        if let Some(client) = self.inner.client.lock().await.take() {
            client.close().await;
        }
        self.inner.store.clear();

        // Recreate command channel so reconnects can spawn a fresh receiver.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    async fn client(&self) -> Option<Arc<FsapiClient>> {
        self.inner.client.lock().await.clone()
    }

    async fn require_client(&self) -> Result<Arc<FsapiClient>, CoreError> {
        self.client().await.ok_or(CoreError::ControllerDisconnected)
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll cycle without publishing it.
    ///
    /// The cycle runs in its own task so that a panic anywhere inside it
    /// degrades to an unavailable snapshot instead of taking the caller
    /// down.
    pub async fn poll_once(&self) -> Snapshot {
        let Some(client) = self.client().await else {
            return Snapshot::unavailable();
        };

        let _guard = self.inner.device_lock.lock().await;
        run_contained(poll_device(client)).await
    }

    /// Poll and publish the result as the current snapshot.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let snapshot = self.poll_once().await;
        self.inner.store.publish(snapshot)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.store.subscribe()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn device_info(&self) -> Arc<DeviceInfo> {
        self.inner.store.device_info()
    }

    // ── Mode / preset tables ─────────────────────────────────────

    /// Cached modes, fetched on first use if the cache is empty.
    pub async fn modes(&self) -> Arc<Vec<Mode>> {
        let cached = self.inner.store.modes();
        if cached.is_empty() && self.client().await.is_some() {
            return self.refresh_modes().await;
        }
        cached
    }

    /// Reload `netRemote.sys.caps.validModes`.
    pub async fn refresh_modes(&self) -> Arc<Vec<Mode>> {
        let Some(client) = self.client().await else {
            return self.inner.store.modes();
        };
        let items = {
            let _guard = self.inner.device_lock.lock().await;
            client.modes().await
        };
        let modes: Vec<Mode> = items.iter().map(Mode::from_item).collect();
        debug!(count = modes.len(), "loaded modes");
        self.inner.store.set_modes(modes);
        self.inner.store.modes()
    }

    /// Cached presets by mode key, fetched on first use if the cache is
    /// empty.
    pub async fn presets(&self) -> Arc<BTreeMap<String, Vec<Preset>>> {
        let cached = self.inner.store.presets();
        if cached.is_empty() && self.client().await.is_some() {
            return self.refresh_presets().await;
        }
        cached
    }

    /// Reload presets for every configured preset mode.
    ///
    /// The device only exposes the active mode's presets, so this switches
    /// through each mode in turn and switches back afterwards.
    pub async fn refresh_presets(&self) -> Arc<BTreeMap<String, Vec<Preset>>> {
        let Some(client) = self.client().await else {
            return self.inner.store.presets();
        };

        let table = {
            let _guard = self.inner.device_lock.lock().await;
            load_presets(&client, &self.inner.config.preset_modes).await
        };
        self.inner.store.set_presets(table);
        self.inner.store.presets()
    }

    /// Named presets across all cached modes.
    pub async fn preset_catalog(&self) -> PresetCatalog {
        let presets = self.presets().await;
        let modes = self.modes().await;
        PresetCatalog::build(&presets, &modes, &self.inner.config.unnamed_preset_labels)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the device.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Check that the device answers with this PIN and read its name.
    ///
    /// Opens a session and reads `friendlyName`, nothing else. The name is
    /// `None` when the device leaves it blank.
    pub async fn verify(config: &ControllerConfig) -> Result<Option<String>, CoreError> {
        let address = config.address();
        let client = FsapiClient::new(address.clone(), config.pin.clone(), &config.transport())?;

        if !client.ensure_session().await {
            return Err(CoreError::Unreachable {
                address: address.to_string(),
                reason: "no session was granted (offline, or wrong PIN)".into(),
            });
        }

        let name = client.get_value(nodes::FRIENDLY_NAME).await;
        client.close().await;
        if !name.status.is_ok() {
            return Err(CoreError::Unreachable {
                address: address.to_string(),
                reason: format!("reading the device name failed with {}", name.status),
            });
        }
        Ok(name
            .as_str()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned))
    }

    /// One-shot: connect, run closure, shut down.
    ///
    /// Disables periodic polling since the CLI only needs a single
    /// request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = Duration::ZERO;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }
}

// ── Poll cycle ───────────────────────────────────────────────────

/// Run a poll cycle on its own task. A panic or cancellation yields an
/// unavailable snapshot.
async fn run_contained<F>(cycle: F) -> Snapshot
where
    F: Future<Output = Snapshot> + Send + 'static,
{
    match tokio::spawn(cycle).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "poll cycle aborted");
            Snapshot::unavailable()
        }
    }
}

/// Read power, then everything else if the device is on.
///
/// Secondary reads are independent, so they go out together; any that
/// fail leave their field at its default.
async fn poll_device(client: Arc<FsapiClient>) -> Snapshot {
    let power = client.get_value(nodes::POWER).await;
    if power.status.is_unreachable() {
        debug!(status = %power.status, "device unavailable");
        return Snapshot::unavailable();
    }
    if !power.is_on() {
        return Snapshot::standby();
    }

    let c = &client;
    let (
        volume,
        volume_steps,
        mute,
        mode,
        play_status,
        name,
        text,
        artist,
        album,
        graphic,
        sleep,
        eq_preset,
        rssi,
        ssid,
        ip_address,
        mac_address,
    ) = tokio::join!(
        c.get_value(nodes::VOLUME),
        c.get_value(nodes::VOLUME_STEPS),
        c.get_value(nodes::MUTE),
        c.get_value(nodes::MODE),
        c.get_value(nodes::PLAY_STATUS),
        c.get_value(nodes::PLAY_NAME),
        c.get_value(nodes::PLAY_TEXT),
        c.get_value(nodes::PLAY_ARTIST),
        c.get_value(nodes::PLAY_ALBUM),
        c.get_value(nodes::PLAY_GRAPHIC),
        c.get_value(nodes::SLEEP),
        c.get_value(nodes::EQ_PRESET),
        c.get_value(nodes::WLAN_RSSI),
        c.get_value(nodes::WLAN_SSID),
        c.get_value(nodes::IP_ADDRESS),
        c.get_value(nodes::WLAN_MAC),
    );

    Snapshot::powered(PoweredState {
        volume: volume.parse().unwrap_or(0),
        volume_steps: volume_steps
            .parse()
            .filter(|steps| *steps > 0)
            .unwrap_or(DEFAULT_VOLUME_STEPS),
        mute: mute.is_on(),
        mode: mode.value,
        play_status: PlayStatus::from_code(play_status.as_str()),
        now_playing: NowPlaying {
            station_name: name.value,
            station_text: text.value,
            artist: artist.value,
            album: album.value,
            graphic_uri: graphic.value,
        },
        network: NetworkInfo {
            wifi_rssi: rssi.value,
            wifi_ssid: ssid.value,
            ip_address: ip_address.value,
            mac_address: mac_address.value,
        },
        sleep_remaining_secs: sleep.parse().unwrap_or(0),
        eq_preset: eq_preset.value,
    })
}

async fn load_presets(
    client: &FsapiClient,
    preset_modes: &[String],
) -> BTreeMap<String, Vec<Preset>> {
    let original_mode = client.get_value(nodes::MODE).await.value;

    let mut table = BTreeMap::new();
    for mode in preset_modes {
        let presets: Vec<Preset> = client
            .presets_for_mode(mode)
            .await
            .iter()
            .map(Preset::from_item)
            .collect();
        debug!(mode = %mode, count = presets.len(), "loaded presets");
        if !presets.is_empty() {
            table.insert(mode.clone(), presets);
        }
    }

    if let Some(original) = original_mode {
        if preset_modes.last() != Some(&original) && !client.set_mode(&original).await {
            warn!(mode = %original, "could not restore mode after loading presets");
        }
    }
    table
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically poll the device and publish the snapshot.
async fn refresh_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let snapshot = controller.refresh().await;
                debug!(
                    available = snapshot.is_available(),
                    power = snapshot.is_powered(),
                    "poll cycle published"
                );
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the matching device write, then refresh.
async fn route_command(controller: &Controller, cmd: Command) -> Result<(), CoreError> {
    match cmd {
        Command::RefreshModes => {
            controller.refresh_modes().await;
            return Ok(());
        }
        Command::RefreshPresets => {
            controller.refresh_presets().await;
            return Ok(());
        }
        _ => {}
    }

    let name = cmd.to_string();
    let Some(write) = resolve_command(controller, cmd).await? else {
        debug!(command = %name, "nothing to do");
        return Ok(());
    };

    let client = controller.require_client().await?;
    let accepted = {
        let _guard = controller.inner.device_lock.lock().await;
        apply_write(&client, write).await
    };

    let snapshot = controller.refresh().await;
    if accepted {
        debug!(command = %name, "command accepted");
        return Ok(());
    }
    if !snapshot.is_available() {
        return Err(CoreError::Unreachable {
            address: client.address().to_string(),
            reason: format!("{name} got no answer"),
        });
    }
    Err(CoreError::Rejected { command: name })
}

/// Turn relative and name-based commands into concrete writes using the
/// current snapshot and cached tables. `None` means already satisfied.
async fn resolve_command(
    controller: &Controller,
    cmd: Command,
) -> Result<Option<Command>, CoreError> {
    let snapshot = controller.snapshot();
    let steps = snapshot
        .state()
        .map_or(DEFAULT_VOLUME_STEPS, |s| s.volume_steps);

    let resolved = match cmd {
        Command::SetVolume { step } => {
            if step > steps {
                return Err(CoreError::ValidationFailed {
                    message: format!("volume step {step} is above the device maximum of {steps}"),
                });
            }
            Command::SetVolume { step }
        }
        Command::SetVolumeLevel { level } => {
            if !(0.0..=1.0).contains(&level) {
                return Err(CoreError::ValidationFailed {
                    message: format!("volume level {level} is outside 0.0..=1.0"),
                });
            }
            Command::SetVolume {
                step: step_for_level(level, steps),
            }
        }
        Command::VolumeUp | Command::VolumeDown => {
            let state = snapshot.state().ok_or_else(|| CoreError::ValidationFailed {
                message: "volume is unknown while the device is off".into(),
            })?;
            let step = if cmd == Command::VolumeUp {
                (state.volume < state.volume_steps).then(|| state.volume + 1)
            } else {
                state.volume.checked_sub(1)
            };
            let Some(step) = step else {
                return Ok(None);
            };
            Command::SetVolume { step }
        }
        Command::SelectSource { name } => {
            let modes = controller.modes().await;
            let key = match modes
                .iter()
                .find(|m| m.display_name().eq_ignore_ascii_case(name.trim()))
            {
                Some(mode) => mode.key.clone(),
                // Without a device table, only the well-known names resolve.
                None if modes.is_empty() => mode_fallback_key(&name)
                    .ok_or(CoreError::SourceNotFound { name })?
                    .to_owned(),
                None => return Err(CoreError::SourceNotFound { name }),
            };
            Command::SelectMode { mode: key }
        }
        Command::SelectCatalogPreset { name } => {
            let catalog = controller.preset_catalog().await;
            let entry = catalog
                .find(&name)
                .ok_or(CoreError::PresetNotFound { name: name.clone() })?;
            Command::SelectPreset {
                mode: Some(entry.mode.clone()),
                key: entry.key.clone(),
            }
        }
        other => other,
    };
    Ok(Some(resolved))
}

async fn apply_write(client: &FsapiClient, cmd: Command) -> bool {
    match cmd {
        Command::PowerOn => client.power_on().await,
        Command::PowerOff => client.power_off().await,
        Command::SetVolume { step } => client.set_volume(step).await,
        Command::Mute => client.mute().await,
        Command::Unmute => client.unmute().await,
        Command::SelectMode { mode } => client.set_mode(&mode).await,
        Command::SelectPreset { mode: None, key } => client.select_preset(&key).await,
        Command::SelectPreset {
            mode: Some(mode),
            key,
        } => client.select_preset_in_mode(&mode, &key).await,
        Command::Play => client.play().await,
        Command::Pause => client.pause().await,
        Command::Stop => client.stop().await,
        Command::NextTrack => client.next_track().await,
        Command::PreviousTrack => client.previous_track().await,
        Command::SetSleepTimer { minutes } => client.set_sleep_timer(minutes).await,
        Command::SetEqPreset { index } => client.set_eq_preset(index).await,
        unresolved @ (Command::SetVolumeLevel { .. }
        | Command::VolumeUp
        | Command::VolumeDown
        | Command::SelectSource { .. }
        | Command::SelectCatalogPreset { .. }
        | Command::RefreshPresets
        | Command::RefreshModes) => {
            warn!(command = %unresolved, "command reached the device unresolved");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garbled_cycle() -> Snapshot {
        panic!("firmware sent nonsense")
    }

    #[tokio::test]
    async fn panicking_poll_cycle_is_unavailable() {
        let snapshot = run_contained(async { garbled_cycle() }).await;
        assert!(!snapshot.is_available());
    }

    #[tokio::test]
    async fn finished_poll_cycle_passes_through() {
        let snapshot = run_contained(async { Snapshot::standby() }).await;
        assert!(snapshot.is_available());
        assert!(!snapshot.is_powered());
    }
}
