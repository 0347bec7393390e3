//! Reader connection lifecycle.
//!
//! The [`ConnectionManager`] is owned by the session worker and is the only
//! writer of the [`DeviceSession`]. It walks the configured transports to pick
//! a reader, connects while publishing a "Connecting..." ticker, wires event
//! delivery and the paired scanner on success, and tears everything down on
//! disconnect, link loss or reader disappearance.
//!
//! ```text
//!   Disconnected ──discover & select──► Connecting ──connect ok──► Connected
//!        ▲                                   │                         │
//!        └──────── discovery/connect error ──┘                         │
//!        └───────────────── disconnect / link lost / disappeared ──────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sledlink_core::{ConnectionState, Error, Result};
use sledlink_hardware::{
    AnyReaderDevice, AnyScannerDevice, DeviceEventListener, EventSubscription, ReaderDescriptor,
    ReaderDevice, ScannerDevice,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::device_error;
use crate::messages::{self, UserMessages};
use crate::notify::Notifier;
use crate::state::SharedState;
use crate::trigger::TriggerModeController;

/// The paired barcode scanner channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSession {
    pub scanner_id: u32,
    pub name: String,
}

/// One connected reader.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    pub host_name: String,
    pub connect_duration: Duration,
    pub connected_at: DateTime<Utc>,
    pub scanner: Option<ScannerSession>,
}

/// Pick a reader from one transport's discovery results.
///
/// A single reader is always selected. Among several, the first whose name
/// starts with `prefix` wins; if none does, nothing is selected.
///
/// # Examples
///
/// ```
/// use sledlink_hardware::{ReaderDescriptor, Transport};
/// use sledlink_session::connection::select_reader;
///
/// let readers = vec![
///     ReaderDescriptor::new("RFD8500", Transport::Bluetooth),
///     ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::Bluetooth),
/// ];
/// let picked = select_reader(readers, "RFD4031-G10B700-WR").unwrap();
/// assert_eq!(picked.name, "RFD4031-G10B700-WR");
/// ```
pub fn select_reader(mut readers: Vec<ReaderDescriptor>, prefix: &str) -> Option<ReaderDescriptor> {
    if readers.len() == 1 {
        return readers.pop();
    }
    readers
        .into_iter()
        .find(|reader| reader.name.starts_with(prefix))
}

/// Owner of the reader connection and the paired scanner session.
pub struct ConnectionManager {
    config: Arc<SessionConfig>,
    reader: Arc<AnyReaderDevice>,
    scanner: Arc<AnyScannerDevice>,
    state: Arc<SharedState>,
    trigger: Arc<TriggerModeController>,
    notifier: Notifier,
    listener: Arc<dyn DeviceEventListener>,
    state_tx: watch::Sender<ConnectionState>,
    session: Option<DeviceSession>,
}

impl ConnectionManager {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: Arc<SessionConfig>,
        reader: Arc<AnyReaderDevice>,
        scanner: Arc<AnyScannerDevice>,
        state: Arc<SharedState>,
        trigger: Arc<TriggerModeController>,
        notifier: Notifier,
        listener: Arc<dyn DeviceEventListener>,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            config,
            reader,
            scanner,
            state,
            trigger,
            notifier,
            listener,
            state_tx,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&DeviceSession> {
        self.session.as_ref()
    }

    /// Whether a session exists and the reader link is up.
    pub fn is_connected(&self) -> bool {
        self.session.is_some() && self.reader.is_connected()
    }

    pub fn scanner_id(&self) -> Option<u32> {
        self.session
            .as_ref()
            .and_then(|session| session.scanner.as_ref())
            .map(|scanner| scanner.scanner_id)
    }

    /// Connect to a reader unless already connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceUnavailable`] if discovery finds no suitable
    /// reader, or the mapped device error if the connect call fails.
    pub async fn connect(&mut self) -> Result<()> {
        if let Some(session) = &self.session {
            if self.reader.is_connected() {
                debug!("Already connected to {}", session.host_name);
                self.notifier
                    .status(messages::connected(&session.host_name), true);
                return Ok(());
            }
            warn!(
                "Session for {} has no live link, resetting",
                session.host_name
            );
            self.disconnect().await;
        }

        self.transition(ConnectionState::Connecting);

        let descriptor = match self.discover().await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Reader discovery failed: {}", e);
                self.transition(ConnectionState::Disconnected);
                self.notifier
                    .status(UserMessages::STATUS_READER_NOT_FOUND, false);
                return Err(e);
            }
        };

        info!(
            "Connecting to {} over {}",
            descriptor.name, descriptor.transport
        );
        let started = Instant::now();

        if let Err(e) = self.connect_with_ticker(&descriptor, started).await {
            error!("Connection to {} failed: {}", descriptor.name, e);
            self.transition(ConnectionState::Disconnected);
            self.notifier
                .status(messages::connection_failed(&e.to_string()), false);
            return Err(device_error(e));
        }

        self.establish(descriptor, started.elapsed()).await;
        Ok(())
    }

    /// Walk the transports in order and select from the first non-empty one.
    async fn discover(&self) -> Result<ReaderDescriptor> {
        for transport in &self.config.transports {
            let readers = self
                .reader
                .available_readers(*transport)
                .await
                .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

            if readers.is_empty() {
                debug!("No readers on {}", transport);
                continue;
            }

            debug!("{} reader(s) on {}", readers.len(), transport);
            return select_reader(readers, &self.config.device_name_prefix).ok_or_else(|| {
                Error::DeviceUnavailable(format!(
                    "no reader named {}* on {}",
                    self.config.device_name_prefix, transport
                ))
            });
        }

        Err(Error::DeviceUnavailable("no readers found".into()))
    }

    /// Run the SDK connect call, publishing "Connecting... Ns" while it runs.
    async fn connect_with_ticker(
        &self,
        descriptor: &ReaderDescriptor,
        started: Instant,
    ) -> sledlink_hardware::Result<()> {
        let connect = self.reader.connect(descriptor);
        tokio::pin!(connect);
        let mut ticker = tokio::time::interval(self.config.connect_status_interval());

        loop {
            tokio::select! {
                biased;

                result = &mut connect => return result,
                _ = ticker.tick() => {
                    let elapsed = started.elapsed().as_secs();
                    self.notifier.status(messages::connecting(elapsed), false);
                }
            }
        }
    }

    /// Wire up a freshly connected reader.
    async fn establish(&mut self, descriptor: ReaderDescriptor, elapsed: Duration) {
        self.state.reset_for_connection();

        let host_name = self
            .reader
            .host_name()
            .unwrap_or_else(|| descriptor.name.clone());

        if let Err(e) = self.reader.add_events_listener(Arc::clone(&self.listener)) {
            warn!("Failed to register reader events listener: {}", e);
        }
        for kind in EventSubscription::ALL {
            if let Err(e) = self.reader.set_event_enabled(kind, true).await {
                warn!("Failed to enable {:?} events: {}", kind, e);
            }
        }

        let scanner = self.establish_scanner_session(&host_name).await;

        info!("Connected to {} in {} ms", host_name, elapsed.as_millis());
        self.session = Some(DeviceSession {
            host_name: host_name.clone(),
            connect_duration: elapsed,
            connected_at: Utc::now(),
            scanner,
        });
        self.transition(ConnectionState::Connected);
        self.notifier
            .status(messages::connected_in(&host_name, elapsed.as_millis()), true);

        if let Err(e) = self.trigger.restore_default_trigger_mode().await {
            warn!("Default trigger configuration failed: {}", e);
        }
    }

    /// Open a session with the scanner whose name contains the reader host
    /// name.
    async fn establish_scanner_session(&self, host_name: &str) -> Option<ScannerSession> {
        let scanners = match self.scanner.available_scanners().await {
            Ok(scanners) => scanners,
            Err(e) => {
                warn!("Scanner enumeration failed: {}", e);
                return None;
            }
        };

        let Some(info) = scanners.into_iter().find(|s| s.name.contains(host_name)) else {
            debug!("No scanner paired with {}", host_name);
            return None;
        };

        match self.scanner.establish_session(info.scanner_id).await {
            Ok(()) => {
                info!("Scanner session established with {}", info.name);
                Some(ScannerSession {
                    scanner_id: info.scanner_id,
                    name: info.name,
                })
            }
            Err(e) => {
                warn!("Scanner session with {} failed: {}", info.name, e);
                None
            }
        }
    }

    /// Tear down the current session. Does nothing when there is none.
    pub async fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("Disconnect requested with no active session");
            self.transition(ConnectionState::Disconnected);
            return;
        };

        info!("Disconnecting from {}", session.host_name);
        self.reader.remove_events_listener();

        if let Some(scanner) = &session.scanner {
            if let Err(e) = self.scanner.terminate_session(scanner.scanner_id).await {
                warn!("Failed to terminate scanner session {}: {}", scanner.scanner_id, e);
            }
        }

        if let Err(e) = self.reader.disconnect().await {
            warn!("Reader disconnect failed: {}", e);
        }
        self.reader.dispose();

        self.transition(ConnectionState::Disconnected);
        self.notifier.status(UserMessages::STATUS_DISCONNECTED, false);
    }

    /// The reader reported that its link dropped.
    pub async fn connection_lost(&mut self) {
        match &self.session {
            Some(session) => warn!("Connection to {} lost", session.host_name),
            None => debug!("Link loss reported with no active session"),
        }
        self.disconnect().await;
    }

    /// A reader vanished from discovery. Only the current host matters.
    pub async fn reader_disappeared(&mut self, name: &str) {
        match &self.session {
            Some(session) if session.host_name == name => {
                info!("Connected reader {} disappeared", name);
                self.disconnect().await;
            }
            _ => debug!("Ignoring disappearance of {}", name),
        }
    }

    /// Forget the scanner session if the scanner went away on its own.
    pub fn scanner_gone(&mut self, scanner_id: u32) {
        if let Some(session) = self.session.as_mut() {
            if session
                .scanner
                .as_ref()
                .is_some_and(|s| s.scanner_id == scanner_id)
            {
                info!("Scanner {} no longer available", scanner_id);
                session.scanner = None;
            }
        }
    }

    /// Disconnect and detach every listener. Final step before the worker
    /// exits.
    pub async fn teardown(&mut self) {
        self.disconnect().await;
        self.reader.detach();
        self.scanner.set_event_listener(None);
        debug!("Device listeners detached");
    }

    fn transition(&self, target: ConnectionState) {
        let current = *self.state_tx.borrow();
        if current == target {
            return;
        }
        if !current.can_transition_to(target) {
            warn!("Unexpected connection transition {} -> {}", current, target);
        }
        debug!("Connection state {} -> {}", current, target);
        self.state_tx.send_replace(target);
    }
}
