#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock radio.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use frontier_api::SettleDelays;
use frontier_core::{Command, Controller, ControllerConfig, CoreError, PlayerState};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> ControllerConfig {
    let addr = server.address();
    let mut cfg = ControllerConfig::new(addr.ip().to_string());
    cfg.port = addr.port();
    cfg.timeout = Duration::from_secs(2);
    cfg.poll_interval = Duration::ZERO;
    cfg.settle = SettleDelays::none();
    cfg.preload_presets = false;
    cfg
}

fn ok_xml() -> String {
    "<fsapiResponse><status>FS_OK</status></fsapiResponse>".into()
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<fsapiResponse><status>FS_OK</status><sessionId>42</sessionId></fsapiResponse>",
        ))
        .mount(server)
        .await;
}

async fn mount_value(server: &MockServer, node: &str, inner: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/fsapi/GET/{node}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<fsapiResponse><status>FS_OK</status><value>{inner}</value></fsapiResponse>"
        )))
        .mount(server)
        .await;
}

async fn mount_set(server: &MockServer, node: &str, value: &str, expect: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/fsapi/SET/{node}")))
        .and(query_param("value", value))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_xml()))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mount_powered_radio(server: &MockServer) {
    mount_session(server).await;
    mount_value(server, "netRemote.sys.power", "<u8>1</u8>").await;
    mount_value(server, "netRemote.sys.audio.volume", "<u8>16</u8>").await;
    mount_value(server, "netRemote.sys.caps.volumeSteps", "<u8>32</u8>").await;
    mount_value(server, "netRemote.sys.audio.mute", "<u8>0</u8>").await;
    mount_value(server, "netRemote.sys.mode", "<u32>4</u32>").await;
    mount_value(server, "netRemote.play.status", "<u8>2</u8>").await;
    mount_value(server, "netRemote.play.info.name", "<c8_array>Classic FM</c8_array>").await;
    mount_value(server, "netRemote.sys.sleep", "<u32>0</u32>").await;
    mount_value(server, "netRemote.sys.net.wlan.rssi", "<u8>200</u8>").await;
    mount_value(server, "netRemote.sys.net.ipConfig.address", "<u32>3232235876</u32>").await;
}

// ── Poll shapes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_device_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let snapshot = controller.snapshot();
    assert!(!snapshot.is_available());
    assert_eq!(
        serde_json::to_value(&*snapshot).unwrap(),
        json!({"available": false, "power": false})
    );
    controller.shutdown().await;
}

#[tokio::test]
async fn test_standby_device() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_value(&server, "netRemote.sys.power", "<u8>0</u8>").await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(
        serde_json::to_value(&*snapshot).unwrap(),
        json!({"available": true, "power": false})
    );
    assert_eq!(snapshot.player_state(), PlayerState::Off);
    controller.shutdown().await;
}

#[tokio::test]
async fn test_malformed_power_reply_is_unavailable() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/GET/netRemote.sys.power"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<<not xml"))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    assert!(!controller.snapshot().is_available());
    controller.shutdown().await;
}

#[tokio::test]
async fn test_powered_snapshot() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let snapshot = controller.snapshot();
    assert!(snapshot.is_available());
    assert!(snapshot.is_powered());
    assert_eq!(snapshot.player_state(), PlayerState::Playing);

    let state = snapshot.state().unwrap();
    assert_eq!(state.volume, 16);
    assert_eq!(state.volume_percent(), 50);
    assert_eq!(state.mode.as_deref(), Some("4"));
    assert_eq!(state.now_playing.title(), Some("Classic FM"));
    assert_eq!(state.network.rssi_dbm(), Some(-56));
    assert_eq!(
        state.network.ipv4().map(|ip| ip.to_string()).as_deref(),
        Some("192.168.1.100")
    );
    // Unmocked nodes are tolerated as missing.
    assert!(state.now_playing.album.is_none());
    assert!(state.eq_preset.is_none());

    controller.shutdown().await;
}

#[tokio::test]
async fn test_subscribers_see_refresh() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_value(&server, "netRemote.sys.power", "<u8>0</u8>").await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let mut rx = controller.subscribe();
    let _ = rx.borrow_and_update();
    controller.refresh().await;
    assert!(rx.has_changed().unwrap());
    assert!(controller.store().last_poll().is_some());

    controller.shutdown().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_volume_level_maps_to_device_step() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    mount_set(&server, "netRemote.sys.audio.volume", "24", 1).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    controller
        .execute(Command::SetVolumeLevel { level: 0.75 })
        .await
        .unwrap();

    controller.shutdown().await;
}

#[tokio::test]
async fn test_volume_up_is_relative() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    mount_set(&server, "netRemote.sys.audio.volume", "17", 1).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    controller.execute(Command::VolumeUp).await.unwrap();
    controller.shutdown().await;
}

#[tokio::test]
async fn test_volume_out_of_range_rejected_locally() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let err = controller
        .execute(Command::SetVolumeLevel { level: 1.5 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "got {err:?}");

    let err = controller
        .execute(Command::SetVolume { step: 40 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "got {err:?}");

    controller.shutdown().await;
}

#[tokio::test]
async fn test_rejected_write() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/SET/netRemote.sys.audio.mute"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<fsapiResponse><status>FS_NODE_BLOCKED</status></fsapiResponse>",
        ))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let err = controller.execute(Command::Mute).await.unwrap_err();
    match err {
        CoreError::Rejected { command } => assert_eq!(command, "mute"),
        other => panic!("expected Rejected, got {other:?}"),
    }

    controller.shutdown().await;
}

#[tokio::test]
async fn test_select_source_by_label() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/LIST_GET_NEXT/netRemote.sys.caps.validModes/-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<fsapiResponse><status>FS_OK</status>
                <item key="0"><field name="label"><c8_array>Internet radio</c8_array></field></item>
                <item key="3"><field name="label"><c8_array>DAB</c8_array></field></item>
               </fsapiResponse>"#,
        ))
        .mount(&server)
        .await;
    mount_set(&server, "netRemote.sys.mode", "3", 1).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    assert_eq!(controller.modes().await.len(), 2);

    controller
        .execute(Command::SelectSource { name: "dab".into() })
        .await
        .unwrap();

    let err = controller
        .execute(Command::SelectSource {
            name: "Cassette".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SourceNotFound { .. }));

    controller.shutdown().await;
}

#[tokio::test]
async fn test_preset_catalog_and_selection() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    mount_set(&server, "netRemote.nav.state", "1", 2).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/LIST_GET_NEXT/netRemote.nav.presets/-1"))
        .and(query_param("maxItems", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<fsapiResponse><status>FS_OK</status>
                <item key="0"><field name="name"><c8_array>Classic</c8_array></field></item>
                <item key="1"><field name="name"><c8_array>Unnamed</c8_array></field></item>
               </fsapiResponse>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_set(&server, "netRemote.nav.action.selectPreset", "0", 1).await;

    let mut cfg = config(&server);
    cfg.preload_presets = true;
    cfg.preset_modes = vec!["4".into()];
    let controller = Controller::new(cfg);
    controller.connect().await.unwrap();

    let catalog = controller.preset_catalog().await;
    let names: Vec<&str> = catalog.entries().iter().map(|e| e.display.as_str()).collect();
    assert_eq!(names, vec!["[FM] Classic"]);

    controller
        .execute(Command::SelectCatalogPreset {
            name: "[FM] Classic".into(),
        })
        .await
        .unwrap();

    let err = controller
        .execute(Command::SelectCatalogPreset {
            name: "Jazz".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PresetNotFound { .. }));

    controller.shutdown().await;
}

#[tokio::test]
async fn test_write_to_silent_device_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let err = controller.execute(Command::PowerOn).await.unwrap_err();
    assert!(matches!(err, CoreError::Unreachable { .. }), "got {err:?}");

    controller.shutdown().await;
}

#[tokio::test]
async fn test_execute_requires_connection() {
    let controller = Controller::new(ControllerConfig::new("127.0.0.1"));
    let err = controller.execute(Command::PowerOn).await.unwrap_err();
    assert!(matches!(err, CoreError::ControllerDisconnected));
}

#[tokio::test]
async fn test_oneshot_runs_closure() {
    let server = MockServer::start().await;
    mount_powered_radio(&server).await;
    mount_set(&server, "netRemote.sys.power", "0", 1).await;

    let powered = Controller::oneshot(config(&server), |ctrl| async move {
        let powered = ctrl.snapshot().is_powered();
        ctrl.execute(Command::PowerOff).await?;
        Ok(powered)
    })
    .await
    .unwrap();
    assert!(powered);
}

// ── Setup check ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_reads_friendly_name() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_value(&server, "netRemote.sys.info.friendlyName", "<c8_array>Kitchen</c8_array>").await;

    let name = Controller::verify(&config(&server)).await.unwrap();
    assert_eq!(name.as_deref(), Some("Kitchen"));
}

#[tokio::test]
async fn test_verify_refused_session_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = Controller::verify(&config(&server)).await.unwrap_err();
    assert!(matches!(err, CoreError::Unreachable { .. }), "{err:?}");
}
