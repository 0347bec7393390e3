//! Connection lifecycle through the coordinator: discovery, connect status,
//! link loss, reader appearance and shutdown.

mod common;

use std::time::Duration;

use common::{Rig, SCANNER_ID, SLED, bare_devices, devices, message_texts, sled, status_texts};
use sledlink_core::{ConnectionState, Error, TriggerMode};
use sledlink_hardware::mock::MockCall;
use sledlink_hardware::{AnyReaderDevice, AnyScannerDevice, ReaderDescriptor, Transport};
use sledlink_session::{Coordinator, SessionConfig, UserMessages};

#[tokio::test(start_paused = true)]
async fn test_connect_pairs_scanner_and_reports_duration() {
    let mut rig = Rig::start(devices());
    rig.wait_for_state(ConnectionState::Connected).await;
    rig.settle().await;

    assert!(rig.handle.is_connected());
    assert!(rig.scanner.has_session(SCANNER_ID));
    assert!(rig.reader.has_events_listener());

    let notifications = rig.drain();
    assert_eq!(
        status_texts(&notifications),
        vec![format!("Connected: {} (0 ms)", SLED)]
    );
    assert!(
        message_texts(&notifications)
            .iter()
            .any(|text| text.starts_with("Scanner established"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_connect_publishes_elapsed_seconds() {
    let devices = devices();
    devices
        .reader_handle
        .set_connect_delay(Duration::from_millis(2500));
    let mut rig = Rig::start(devices);

    rig.wait_for_state(ConnectionState::Connected).await;
    rig.settle().await;

    let statuses = status_texts(&rig.drain());
    assert_eq!(
        &statuses[..3],
        &["Connecting... 0s", "Connecting... 1s", "Connecting... 2s"]
    );
    assert_eq!(statuses.len(), 4);
    assert!(statuses[3].starts_with(&format!("Connected: {} (250", SLED)));
}

#[tokio::test(start_paused = true)]
async fn test_prefix_selects_among_several_readers() {
    let devices = bare_devices();
    devices
        .reader_handle
        .add_reader(ReaderDescriptor::new("RFD8500 1", Transport::ServiceUsb));
    devices.reader_handle.add_reader(ReaderDescriptor::new(
        "RFD4031-G10B700-WR 77",
        Transport::ServiceUsb,
    ));
    let rig = Rig::start(devices);

    rig.wait_for_state(ConnectionState::Connected).await;

    assert!(
        rig.reader
            .calls()
            .contains(&MockCall::Connect("RFD4031-G10B700-WR 77".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_later_transport_is_searched() {
    let devices = bare_devices();
    devices
        .reader_handle
        .add_reader(ReaderDescriptor::new("RFD8500 BT", Transport::Bluetooth));
    let rig = Rig::start(devices);

    rig.wait_for_state(ConnectionState::Connected).await;

    assert!(rig.handle.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_no_matching_reader_is_not_found() {
    let devices = bare_devices();
    devices
        .reader_handle
        .add_reader(ReaderDescriptor::new("RFD8500 1", Transport::ServiceUsb));
    devices
        .reader_handle
        .add_reader(ReaderDescriptor::new("RFD8500 2", Transport::ServiceUsb));
    let mut rig = Rig::start(devices);
    rig.settle().await;

    assert_eq!(rig.handle.connection_state(), ConnectionState::Disconnected);
    assert_eq!(
        status_texts(&rig.drain()),
        vec![UserMessages::STATUS_READER_NOT_FOUND.to_string()]
    );
    assert!(
        !rig.reader
            .calls()
            .iter()
            .any(|call| matches!(call, MockCall::Connect(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_discovery_failure_reports_not_found() {
    let devices = devices();
    devices
        .reader_handle
        .fail_discovery(Transport::ServiceUsb, "RFID service unavailable");
    let mut rig = Rig::start(devices);
    rig.settle().await;

    assert!(!rig.handle.is_connected());
    assert_eq!(
        status_texts(&rig.drain()),
        vec![UserMessages::STATUS_READER_NOT_FOUND.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_then_retry() {
    let devices = devices();
    devices
        .reader_handle
        .fail_connect(Some("link refused".into()));
    let mut rig = Rig::start(devices);
    rig.settle().await;

    assert_eq!(rig.handle.connection_state(), ConnectionState::Disconnected);
    let statuses = status_texts(&rig.drain());
    assert_eq!(
        statuses.last().map(String::as_str),
        Some("Connection failed: Communication error: link refused")
    );

    rig.reader.fail_connect(None);
    rig.handle.connect().unwrap();
    rig.wait_for_state(ConnectionState::Connected).await;
    assert!(rig.handle.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_connect_while_connected_republishes_status() {
    let mut rig = Rig::connected().await;

    rig.handle.connect().unwrap();
    rig.settle().await;

    assert_eq!(
        status_texts(&rig.drain()),
        vec![format!("Connected: {}", SLED)]
    );
    assert!(
        !rig.reader
            .calls()
            .iter()
            .any(|call| matches!(call, MockCall::Connect(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_is_idempotent() {
    let mut rig = Rig::connected().await;

    rig.handle.disconnect().unwrap();
    rig.handle.disconnect().unwrap();
    rig.settle().await;

    assert_eq!(rig.handle.connection_state(), ConnectionState::Disconnected);
    assert_eq!(
        rig.reader.calls(),
        vec![
            MockCall::RemoveEventsListener,
            MockCall::Disconnect,
            MockCall::Dispose
        ]
    );
    assert!(!rig.scanner.has_session(SCANNER_ID));
    assert_eq!(
        status_texts(&rig.drain()),
        vec![UserMessages::STATUS_DISCONNECTED.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_pause_resume_and_toggle() {
    let rig = Rig::connected().await;

    rig.handle.pause().unwrap();
    rig.wait_for_state(ConnectionState::Disconnected).await;

    rig.handle.resume().unwrap();
    rig.wait_for_state(ConnectionState::Connected).await;

    rig.handle.toggle_connection().unwrap();
    rig.wait_for_state(ConnectionState::Disconnected).await;

    rig.handle.toggle_connection().unwrap();
    rig.wait_for_state(ConnectionState::Connected).await;
    rig.settle().await;
    assert_eq!(rig.handle.trigger_mode().await, TriggerMode::Rfid);
}

#[tokio::test(start_paused = true)]
async fn test_link_loss_then_reappearance_reconnects() {
    let mut rig = Rig::connected().await;

    rig.reader.drop_connection();
    rig.settle().await;

    assert!(!rig.handle.is_connected());
    assert_eq!(rig.handle.connection_state(), ConnectionState::Disconnected);
    assert!(!rig.scanner.has_session(SCANNER_ID));
    assert!(status_texts(&rig.drain()).contains(&UserMessages::STATUS_DISCONNECTED.to_string()));

    rig.reader.remove_reader(SLED);
    rig.settle().await;
    rig.reader.add_reader(sled());

    rig.wait_for_state(ConnectionState::Connected).await;
    rig.settle().await;
    assert!(rig.handle.is_connected());
    assert!(rig.scanner.has_session(SCANNER_ID));
    assert!(rig.reader.has_events_listener());
}

#[tokio::test(start_paused = true)]
async fn test_current_reader_disappearing_disconnects() {
    let mut rig = Rig::connected().await;

    rig.reader.remove_reader(SLED);
    rig.settle().await;

    assert_eq!(rig.handle.connection_state(), ConnectionState::Disconnected);
    let notifications = rig.drain();
    assert!(message_texts(&notifications).contains(&format!("Reader {} disappeared", SLED)));
    assert!(status_texts(&notifications).contains(&UserMessages::STATUS_DISCONNECTED.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_other_reader_disappearing_is_ignored() {
    let rig = Rig::connected().await;

    rig.reader
        .add_reader(ReaderDescriptor::new("RFD8500 9", Transport::Bluetooth));
    rig.settle().await;
    rig.reader.remove_reader("RFD8500 9");
    rig.settle().await;

    assert!(rig.handle.is_connected());
    assert!(!rig.reader.calls().contains(&MockCall::Disconnect));
}

#[tokio::test(start_paused = true)]
async fn test_commands_rejected_without_reader() {
    let mut rig = Rig::start(bare_devices());
    rig.settle().await;
    rig.drain();

    assert_eq!(
        rig.handle.set_trigger_mode(TriggerMode::Barcode).await,
        Err(Error::NotConnected)
    );
    assert_eq!(
        rig.handle.restore_default_trigger_mode().await,
        Err(Error::NotConnected)
    );
    assert_eq!(rig.handle.arm_scan_test(), Err(Error::NotConnected));
    assert_eq!(rig.handle.scan_code(), Err(Error::NotConnected));
    assert_eq!(rig.reader.layout_write_count(), 0);
    assert_eq!(
        message_texts(&rig.drain()),
        vec![
            UserMessages::SCAN_TEST_REJECTED.to_string(),
            UserMessages::SKIP_NOT_CONNECTED.to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_detaches_everything() {
    let Rig {
        handle,
        mut notifications,
        reader,
        scanner,
    } = Rig::connected().await;

    handle.shutdown().await.unwrap();

    assert!(!reader.is_attached());
    assert!(!reader.has_events_listener());
    assert!(reader.calls().contains(&MockCall::Disconnect));
    assert!(!scanner.has_listener());
    assert!(!scanner.has_session(SCANNER_ID));

    let drained = tokio::time::timeout(Duration::from_secs(1), async {
        while notifications.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "notification stream should end");
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SessionConfig {
        tag_batch_size: 0,
        ..SessionConfig::default()
    };
    let result = Coordinator::new(
        config,
        AnyReaderDevice::Mock(Default::default()),
        AnyScannerDevice::Mock(Default::default()),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
