//! Mock RFID sled reader for testing and development.
//!
//! The mock keeps its state behind a shared mutex so the reader (owned by the
//! coordinator) and its control handle (owned by the test) see the same
//! device. Listeners are always invoked after the lock is released.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::Result;
use crate::error::HardwareError;
use crate::events::{DeviceEvent, DeviceEventListener, StatusEvent, TriggerAction};
use crate::traits::ReaderDevice;
use crate::types::{
    EventSubscription, KeyLayoutType, ReaderDescriptor, TagData, Transport, TriggerLayout,
};

/// One call made against a [`MockReader`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Connect(String),
    Disconnect,
    Dispose,
    AddEventsListener,
    RemoveEventsListener,
    SetEventEnabled(EventSubscription, bool),
    /// Recorded when the write starts, before any configured delay.
    SetTriggerLayout(TriggerLayout),
    PerformInventory,
    StopInventory,
    ReadTags(usize),
}

struct ReaderState {
    name: String,
    readers: HashMap<Transport, Vec<ReaderDescriptor>>,
    discovery_failures: HashMap<Transport, String>,
    connected: Option<ReaderDescriptor>,
    appearance_listener: Option<Arc<dyn DeviceEventListener>>,
    events_listener: Option<Arc<dyn DeviceEventListener>>,
    enabled: HashSet<EventSubscription>,
    layout: TriggerLayout,
    layout_failures: u32,
    layout_write_delay: Duration,
    connect_delay: Duration,
    connect_failure: Option<String>,
    auto_inventory_events: bool,
    inventory_running: bool,
    tags: VecDeque<TagData>,
    calls: Vec<MockCall>,
}

impl fmt::Debug for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderState")
            .field("name", &self.name)
            .field("connected", &self.connected)
            .field("layout", &self.layout)
            .field("inventory_running", &self.inventory_running)
            .finish_non_exhaustive()
    }
}

impl ReaderState {
    fn require_connected(&self) -> Result<&ReaderDescriptor> {
        self.connected
            .as_ref()
            .ok_or_else(|| HardwareError::invalid_usage("reader not connected"))
    }

    /// Listener for a status event, if one is registered and the event family
    /// is enabled.
    fn status_target(&self, kind: EventSubscription) -> Option<Arc<dyn DeviceEventListener>> {
        if self.connected.is_some() && self.enabled.contains(&kind) {
            self.events_listener.clone()
        } else {
            None
        }
    }
}

fn lock(state: &Mutex<ReaderState>) -> MutexGuard<'_, ReaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn deliver(target: Option<Arc<dyn DeviceEventListener>>, event: DeviceEvent) {
    match target {
        Some(listener) => {
            trace!("Mock reader delivering {:?}", event);
            listener.on_event(event);
        }
        None => trace!("Mock reader dropped {:?} (no subscriber)", event),
    }
}

/// Mock RFID sled reader.
///
/// # Examples
///
/// ```
/// use sledlink_hardware::mock::MockReader;
/// use sledlink_hardware::traits::ReaderDevice;
/// use sledlink_hardware::types::{ReaderDescriptor, Transport};
///
/// #[tokio::main]
/// async fn main() -> sledlink_hardware::Result<()> {
///     let (reader, handle) = MockReader::new();
///     handle.add_reader(ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::Bluetooth));
///
///     let found = reader.available_readers(Transport::Bluetooth).await?;
///     reader.connect(&found[0]).await?;
///     assert_eq!(reader.host_name().as_deref(), Some("RFD4031-G10B700-WR"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockReader {
    state: Arc<Mutex<ReaderState>>,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock RFID Sled".to_string())
    }

    /// Create a new mock reader with a custom SDK name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let state = Arc::new(Mutex::new(ReaderState {
            name,
            readers: HashMap::new(),
            discovery_failures: HashMap::new(),
            connected: None,
            appearance_listener: None,
            events_listener: None,
            enabled: HashSet::new(),
            layout: TriggerLayout::default(),
            layout_failures: 0,
            layout_write_delay: Duration::ZERO,
            connect_delay: Duration::ZERO,
            connect_failure: None,
            auto_inventory_events: true,
            inventory_running: false,
            tags: VecDeque::new(),
            calls: Vec::new(),
        }));

        let reader = Self {
            state: Arc::clone(&state),
        };
        (reader, MockReaderHandle { state })
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl ReaderDevice for MockReader {
    async fn available_readers(&self, transport: Transport) -> Result<Vec<ReaderDescriptor>> {
        let state = lock(&self.state);
        if let Some(message) = state.discovery_failures.get(&transport) {
            return Err(HardwareError::discovery(message.clone()));
        }

        let found = state.readers.get(&transport).cloned().unwrap_or_default();
        debug!("Mock discovery on {}: {} reader(s)", transport, found.len());
        Ok(found)
    }

    fn attach(&self, listener: Arc<dyn DeviceEventListener>) {
        lock(&self.state).appearance_listener = Some(listener);
    }

    fn detach(&self) {
        lock(&self.state).appearance_listener = None;
    }

    async fn connect(&self, reader: &ReaderDescriptor) -> Result<()> {
        let delay = {
            let mut state = lock(&self.state);
            state.calls.push(MockCall::Connect(reader.name.clone()));
            state.connect_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        if let Some(message) = state.connect_failure.clone() {
            return Err(HardwareError::communication(message));
        }

        let known = state
            .readers
            .values()
            .flatten()
            .any(|candidate| candidate.name == reader.name);
        if !known {
            return Err(HardwareError::disconnected(reader.name.clone()));
        }

        state.connected = Some(reader.clone());
        state.inventory_running = false;
        debug!("Mock reader connected: {}", reader.name);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(MockCall::Disconnect);
        state.connected = None;
        state.inventory_running = false;
        state.enabled.clear();
        Ok(())
    }

    fn dispose(&self) {
        let mut state = lock(&self.state);
        state.calls.push(MockCall::Dispose);
        state.events_listener = None;
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).connected.is_some()
    }

    fn host_name(&self) -> Option<String> {
        lock(&self.state)
            .connected
            .as_ref()
            .map(|reader| reader.name.clone())
    }

    fn add_events_listener(&self, listener: Arc<dyn DeviceEventListener>) -> Result<()> {
        let mut state = lock(&self.state);
        state.require_connected()?;
        state.calls.push(MockCall::AddEventsListener);
        state.events_listener = Some(listener);
        Ok(())
    }

    fn remove_events_listener(&self) {
        let mut state = lock(&self.state);
        state.calls.push(MockCall::RemoveEventsListener);
        state.events_listener = None;
    }

    async fn set_event_enabled(&self, kind: EventSubscription, enabled: bool) -> Result<()> {
        let mut state = lock(&self.state);
        state.require_connected()?;
        state.calls.push(MockCall::SetEventEnabled(kind, enabled));
        if enabled {
            state.enabled.insert(kind);
        } else {
            state.enabled.remove(&kind);
        }
        Ok(())
    }

    async fn set_trigger_layout(&self, layout: TriggerLayout) -> Result<()> {
        let delay = {
            let mut state = lock(&self.state);
            state.require_connected()?;
            if state.inventory_running {
                return Err(HardwareError::operation_in_progress("inventory"));
            }
            state.calls.push(MockCall::SetTriggerLayout(layout));
            state.layout_write_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        if state.layout_failures > 0 {
            state.layout_failures -= 1;
            return Err(HardwareError::operation_failure(
                "RFID_COMM_SEND_FAILED",
                "trigger layout write rejected",
            ));
        }

        state.layout = layout;
        Ok(())
    }

    async fn upper_trigger(&self) -> Result<KeyLayoutType> {
        let state = lock(&self.state);
        state.require_connected()?;
        Ok(state.layout.upper)
    }

    async fn lower_trigger(&self) -> Result<KeyLayoutType> {
        let state = lock(&self.state);
        state.require_connected()?;
        Ok(state.layout.lower)
    }

    async fn perform_inventory(&self) -> Result<()> {
        let target = {
            let mut state = lock(&self.state);
            state.require_connected()?;
            if state.inventory_running {
                return Err(HardwareError::operation_in_progress("inventory"));
            }
            state.calls.push(MockCall::PerformInventory);
            state.inventory_running = true;

            if state.auto_inventory_events {
                state.status_target(EventSubscription::InventoryStartStop)
            } else {
                None
            }
        };

        if target.is_some() {
            deliver(target, DeviceEvent::Status(StatusEvent::InventoryStart));
        }
        Ok(())
    }

    async fn stop_inventory(&self) -> Result<()> {
        let target = {
            let mut state = lock(&self.state);
            state.require_connected()?;
            state.calls.push(MockCall::StopInventory);
            let was_running = std::mem::replace(&mut state.inventory_running, false);

            if was_running && state.auto_inventory_events {
                state.status_target(EventSubscription::InventoryStartStop)
            } else {
                None
            }
        };

        if target.is_some() {
            deliver(target, DeviceEvent::Status(StatusEvent::InventoryStop));
        }
        Ok(())
    }

    async fn read_tags(&self, max: usize) -> Result<Vec<TagData>> {
        let mut state = lock(&self.state);
        state.require_connected()?;
        state.calls.push(MockCall::ReadTags(max));
        let count = max.min(state.tags.len());
        Ok(state.tags.drain(..count).collect())
    }
}

/// Handle for controlling a [`MockReader`].
///
/// Shares state with the reader it was created with; clones control the same
/// device.
///
/// # Examples
///
/// ```
/// use sledlink_hardware::mock::{MockCall, MockReader};
/// use sledlink_hardware::traits::ReaderDevice;
/// use sledlink_hardware::types::{ReaderDescriptor, Transport};
///
/// #[tokio::main]
/// async fn main() -> sledlink_hardware::Result<()> {
///     let (reader, handle) = MockReader::new();
///     let sled = ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::ServiceUsb);
///     handle.add_reader(sled.clone());
///
///     reader.connect(&sled).await?;
///     reader.perform_inventory().await?;
///     reader.stop_inventory().await?;
///
///     assert_eq!(handle.stop_inventory_count(), 1);
///     assert!(handle.calls().contains(&MockCall::PerformInventory));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    state: Arc<Mutex<ReaderState>>,
}

impl MockReaderHandle {
    /// Make a reader discoverable on its transport.
    ///
    /// Emits `ReaderAppeared` if an appearance listener is attached.
    pub fn add_reader(&self, reader: ReaderDescriptor) {
        let target = {
            let mut state = lock(&self.state);
            state
                .readers
                .entry(reader.transport)
                .or_default()
                .push(reader.clone());
            state.appearance_listener.clone()
        };
        deliver(target, DeviceEvent::ReaderAppeared(reader));
    }

    /// Remove a reader from discovery.
    ///
    /// Emits `ReaderDisappeared` if an appearance listener is attached. The
    /// link itself is not touched; use [`drop_connection`](Self::drop_connection)
    /// for that.
    pub fn remove_reader(&self, name: &str) {
        let (removed, target) = {
            let mut state = lock(&self.state);
            let mut removed = None;
            for readers in state.readers.values_mut() {
                if let Some(pos) = readers.iter().position(|r| r.name == name) {
                    removed = Some(readers.remove(pos));
                }
            }
            (removed, state.appearance_listener.clone())
        };

        if let Some(reader) = removed {
            deliver(target, DeviceEvent::ReaderDisappeared(reader));
        }
    }

    /// Make discovery fail on a transport.
    pub fn fail_discovery(&self, transport: Transport, message: impl Into<String>) {
        lock(&self.state)
            .discovery_failures
            .insert(transport, message.into());
    }

    /// Simulate the reader link dropping.
    ///
    /// Emits a `DISCONNECTION` status event when that family is enabled.
    pub fn drop_connection(&self) {
        let target = {
            let mut state = lock(&self.state);
            let target = state.status_target(EventSubscription::ReaderDisconnect);
            state.connected = None;
            state.inventory_running = false;
            target
        };
        deliver(target, DeviceEvent::Status(StatusEvent::Disconnection));
    }

    /// Press the handheld trigger.
    pub fn press_trigger(&self) {
        self.trigger(TriggerAction::Pressed);
    }

    /// Release the handheld trigger.
    pub fn release_trigger(&self) {
        self.trigger(TriggerAction::Released);
    }

    fn trigger(&self, action: TriggerAction) {
        let target = lock(&self.state).status_target(EventSubscription::HandheldTrigger);
        deliver(
            target,
            DeviceEvent::Status(StatusEvent::HandheldTrigger(action)),
        );
    }

    /// Deliver an event straight to the events listener, bypassing
    /// subscription filters.
    pub fn inject(&self, event: DeviceEvent) {
        let target = lock(&self.state).events_listener.clone();
        deliver(target, event);
    }

    /// Deliver a status event through the normal subscription filter.
    pub fn emit_status(&self, status: StatusEvent) {
        let kind = match status {
            StatusEvent::HandheldTrigger(_) => EventSubscription::HandheldTrigger,
            StatusEvent::Disconnection => EventSubscription::ReaderDisconnect,
            StatusEvent::InventoryStart | StatusEvent::InventoryStop => {
                EventSubscription::InventoryStartStop
            }
            _ => EventSubscription::OperationEndSummary,
        };
        let target = lock(&self.state).status_target(kind);
        deliver(target, DeviceEvent::Status(status));
    }

    /// Buffer tags and emit a tag read notification.
    pub fn queue_tags(&self, tags: impl IntoIterator<Item = TagData>) {
        let target = {
            let mut state = lock(&self.state);
            state.tags.extend(tags);
            state.status_target(EventSubscription::TagRead)
        };
        deliver(target, DeviceEvent::TagsRead);
    }

    /// Make the next `count` trigger layout writes fail.
    pub fn set_layout_failures(&self, count: u32) {
        lock(&self.state).layout_failures = count;
    }

    /// Delay every trigger layout write.
    pub fn set_layout_write_delay(&self, delay: Duration) {
        lock(&self.state).layout_write_delay = delay;
    }

    /// Delay every connect call.
    pub fn set_connect_delay(&self, delay: Duration) {
        lock(&self.state).connect_delay = delay;
    }

    /// Make connect calls fail (or succeed again, with `None`).
    pub fn fail_connect(&self, message: Option<String>) {
        lock(&self.state).connect_failure = message;
    }

    /// Whether perform/stop inventory emit start/stop status events.
    ///
    /// Enabled by default.
    pub fn set_auto_inventory_events(&self, enabled: bool) {
        lock(&self.state).auto_inventory_events = enabled;
    }

    /// Mark inventory running without emitting any event.
    pub fn set_inventory_running(&self, running: bool) {
        lock(&self.state).inventory_running = running;
    }

    /// Current hardware trigger layout.
    pub fn layout(&self) -> TriggerLayout {
        lock(&self.state).layout
    }

    /// Whether an event family is enabled.
    pub fn is_event_enabled(&self, kind: EventSubscription) -> bool {
        lock(&self.state).enabled.contains(&kind)
    }

    /// Whether an events listener is registered.
    pub fn has_events_listener(&self) -> bool {
        lock(&self.state).events_listener.is_some()
    }

    /// Whether an appearance listener is attached.
    pub fn is_attached(&self) -> bool {
        lock(&self.state).appearance_listener.is_some()
    }

    /// Whether inventory is running.
    pub fn is_inventory_running(&self) -> bool {
        lock(&self.state).inventory_running
    }

    /// Every call made against the reader so far.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.state).calls.clone()
    }

    /// Number of stop inventory calls.
    pub fn stop_inventory_count(&self) -> usize {
        self.count(|call| matches!(call, MockCall::StopInventory))
    }

    /// Number of trigger layout writes attempted.
    pub fn layout_write_count(&self) -> usize {
        self.count(|call| matches!(call, MockCall::SetTriggerLayout(_)))
    }

    fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// SDK name of the mock device.
    pub fn name(&self) -> String {
        lock(&self.state).name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Mutex<Vec<DeviceEvent>>);

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Vec::new())))
        }

        fn events(&self) -> Vec<DeviceEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    impl DeviceEventListener for Recorder {
        fn on_event(&self, event: DeviceEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn sled() -> ReaderDescriptor {
        ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::ServiceUsb)
    }

    async fn connected() -> (MockReader, MockReaderHandle, Arc<Recorder>) {
        let (reader, handle) = MockReader::new();
        handle.add_reader(sled());
        reader.connect(&sled()).await.unwrap();

        let recorder = Recorder::new();
        reader.add_events_listener(recorder.clone()).unwrap();
        for kind in EventSubscription::ALL {
            reader.set_event_enabled(kind, true).await.unwrap();
        }
        (reader, handle, recorder)
    }

    #[tokio::test]
    async fn test_discovery_by_transport() {
        let (reader, handle) = MockReader::new();
        handle.add_reader(sled());

        assert_eq!(reader.available_readers(Transport::ServiceUsb).await.unwrap().len(), 1);
        assert!(reader.available_readers(Transport::Bluetooth).await.unwrap().is_empty());

        handle.fail_discovery(Transport::Bluetooth, "adapter off");
        assert!(matches!(
            reader.available_readers(Transport::Bluetooth).await,
            Err(HardwareError::DiscoveryFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_unknown_reader_fails() {
        let (reader, _handle) = MockReader::new();
        assert!(reader.connect(&sled()).await.is_err());
        assert!(!reader.is_connected());
    }

    #[tokio::test]
    async fn test_inventory_emits_start_and_stop() {
        let (reader, handle, recorder) = connected().await;

        reader.perform_inventory().await.unwrap();
        assert!(handle.is_inventory_running());
        reader.stop_inventory().await.unwrap();
        // Second stop on an idle reader emits nothing
        reader.stop_inventory().await.unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                DeviceEvent::Status(StatusEvent::InventoryStart),
                DeviceEvent::Status(StatusEvent::InventoryStop),
            ]
        );
        assert_eq!(handle.stop_inventory_count(), 2);
    }

    #[tokio::test]
    async fn test_layout_write_rejected_while_inventory_runs() {
        let (reader, handle, _recorder) = connected().await;
        reader.perform_inventory().await.unwrap();

        let result = reader
            .set_trigger_layout(TriggerLayout::uniform(KeyLayoutType::SledScan))
            .await;
        assert!(matches!(result, Err(HardwareError::OperationInProgress { .. })));
        assert_eq!(handle.layout(), TriggerLayout::default());
    }

    #[tokio::test]
    async fn test_layout_failures_are_consumed() {
        let (reader, handle, _recorder) = connected().await;
        handle.set_layout_failures(1);
        let barcode = TriggerLayout::uniform(KeyLayoutType::SledScan);

        assert!(reader.set_trigger_layout(barcode).await.is_err());
        assert_eq!(handle.layout(), TriggerLayout::default());

        reader.set_trigger_layout(barcode).await.unwrap();
        assert_eq!(reader.upper_trigger().await.unwrap(), KeyLayoutType::SledScan);
        assert_eq!(handle.layout_write_count(), 2);
    }

    #[tokio::test]
    async fn test_trigger_respects_subscription() {
        let (reader, handle, recorder) = connected().await;

        reader
            .set_event_enabled(EventSubscription::HandheldTrigger, false)
            .await
            .unwrap();
        handle.press_trigger();
        assert!(recorder.events().is_empty());

        reader
            .set_event_enabled(EventSubscription::HandheldTrigger, true)
            .await
            .unwrap();
        handle.press_trigger();
        assert_eq!(
            recorder.events(),
            vec![DeviceEvent::Status(StatusEvent::HandheldTrigger(
                TriggerAction::Pressed
            ))]
        );
    }

    #[tokio::test]
    async fn test_read_tags_drains_in_batches() {
        let (reader, handle, recorder) = connected().await;
        handle.queue_tags((0..5).map(|i| TagData::new(format!("E200{i:04}"), -40)));

        assert_eq!(recorder.events(), vec![DeviceEvent::TagsRead]);
        assert_eq!(reader.read_tags(3).await.unwrap().len(), 3);
        assert_eq!(reader.read_tags(3).await.unwrap().len(), 2);
        assert!(reader.read_tags(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_appearance_events() {
        let (reader, handle) = MockReader::new();
        let recorder = Recorder::new();
        reader.attach(recorder.clone());

        handle.add_reader(sled());
        handle.remove_reader("RFD4031-G10B700-WR");
        handle.remove_reader("unknown");

        assert_eq!(
            recorder.events(),
            vec![
                DeviceEvent::ReaderAppeared(sled()),
                DeviceEvent::ReaderDisappeared(sled()),
            ]
        );

        reader.detach();
        assert!(!handle.is_attached());
    }

    #[tokio::test]
    async fn test_drop_connection_emits_disconnection() {
        let (reader, handle, recorder) = connected().await;
        handle.drop_connection();

        assert!(!reader.is_connected());
        assert_eq!(
            recorder.events(),
            vec![DeviceEvent::Status(StatusEvent::Disconnection)]
        );
    }
}
