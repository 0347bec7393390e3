//! Scripted demo session against the mock sled.
//!
//! Usage: `sledlink [config.json]`
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sledlink_core::{ConnectionState, TriggerMode};
use sledlink_hardware::mock::{MockReader, MockReaderHandle, MockScanner, MockScannerHandle};
use sledlink_hardware::{
    AnyReaderDevice, AnyScannerDevice, ReaderDescriptor, ScannerInfo, TagData, Transport,
};
use sledlink_session::{Coordinator, CoordinatorHandle, Notification, Notifications, SessionConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SCANNER_ID: u32 = 1;
const STEP: Duration = Duration::from_millis(300);

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Log every notification until the stream ends.
async fn print_notifications(mut notifications: Notifications) {
    while let Some(notification) = notifications.recv().await {
        match notification {
            Notification::ReaderStatus { text, connected } => {
                info!("[status] {} (connected={})", text, connected)
            }
            Notification::TagsRead(tags) => {
                for tag in tags {
                    info!("[tag] {} rssi={} antenna={}", tag.tag_id, tag.peak_rssi, tag.antenna_id);
                }
            }
            Notification::Barcode(data) => info!("[barcode] {}", data),
            Notification::Message { text, .. } => info!("[message] {}", text.replace("\r\n", " ")),
            other => info!("[ui] {:?}", other),
        }
    }
}

async fn wait_connected(handle: &CoordinatorHandle) -> Result<()> {
    let mut states = handle.connection_states();
    tokio::time::timeout(
        Duration::from_secs(10),
        states.wait_for(|state| *state == ConnectionState::Connected),
    )
    .await
    .context("reader did not connect")?
    .context("coordinator stopped")?;
    Ok(())
}

async fn run_inventory(reader: &MockReaderHandle) {
    reader.press_trigger();
    tokio::time::sleep(STEP).await;
    reader.queue_tags([
        TagData::new("E28011606000020D6B1B3C2A", -48),
        TagData::new("E28011606000020D6B1B3C2B", -57).with_antenna(2),
    ]);
    tokio::time::sleep(STEP).await;
    reader.release_trigger();
    tokio::time::sleep(STEP).await;
}

async fn run_script(
    handle: &CoordinatorHandle,
    reader: &MockReaderHandle,
    scanner: &MockScannerHandle,
) -> Result<()> {
    wait_connected(handle).await?;
    tokio::time::sleep(STEP).await;

    info!("Step 1: inventory by trigger");
    run_inventory(reader).await;

    info!("Step 2: scan test");
    handle.arm_scan_test()?;
    run_inventory(reader).await;
    info!("Trigger mode during handoff: {}", handle.trigger_mode().await);
    scanner.scan_barcode(SCANNER_ID, "4006381333931");
    tokio::time::sleep(STEP).await;
    info!("Trigger mode after barcode: {}", handle.trigger_mode().await);

    info!("Step 3: trigger mode change while busy");
    reader.press_trigger();
    tokio::time::sleep(STEP).await;
    if let Err(e) = handle.set_trigger_mode(TriggerMode::Barcode).await {
        warn!("Rejected as expected: {}", e);
    }
    tokio::time::sleep(STEP).await;
    handle.set_trigger_mode(TriggerMode::Barcode).await?;
    handle.restore_default_trigger_mode().await?;

    info!("Step 4: software scan");
    scanner.queue_barcode("9780201633610");
    handle.scan_code()?;
    tokio::time::sleep(STEP).await;

    info!("Step 5: link loss and reappearance");
    reader.drop_connection();
    tokio::time::sleep(STEP).await;
    reader.remove_reader(&reader.name());
    reader.add_reader(ReaderDescriptor::new(reader.name(), Transport::ServiceUsb));
    wait_connected(handle).await?;
    tokio::time::sleep(STEP).await;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;
    let sled_name = format!("{} 0042", config.device_name_prefix);

    let (reader, reader_handle) = MockReader::with_name(sled_name.clone());
    reader_handle.add_reader(ReaderDescriptor::new(sled_name.clone(), Transport::ServiceUsb));
    let (scanner, scanner_handle) = MockScanner::new();
    scanner_handle.add_scanner(ScannerInfo::new(SCANNER_ID, format!("{} scanner", sled_name)));

    let coordinator = Coordinator::new(
        config,
        AnyReaderDevice::Mock(reader),
        AnyScannerDevice::Mock(scanner),
    )?;
    let (handle, notifications) = coordinator.start();
    let printer = tokio::spawn(print_notifications(notifications));

    let outcome = run_script(&handle, &reader_handle, &scanner_handle).await;

    handle.shutdown().await?;
    printer.await.context("notification printer panicked")?;
    outcome
}
