//! Reconnecting client - Supervised bridge connection with typed senders.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};

use super::{ClientError, ConnectionPhase, WebSocketConnector};
use crate::adapters::websocket::ServerMessage;
use crate::domain::events::{
    defaults, CustomArg, CustomMessage, FrequencyData, KeyboardEvent, NoteOff, NoteOn,
    NoteRecord, OctaveChange, PolyphonyUpdate, ScaleChange,
};
use crate::domain::foundation::{StateMachine, Timestamp};
use crate::ports::{ClientLink, LinkCommand, LinkEvent, SocketConnector};

const DEFAULT_URL: &str = "ws://localhost:8080";
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;
const EVENT_CAPACITY: usize = 64;

/// Connection settings for a [`ReconnectingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub url: String,
    pub tet_system: String,
    pub auto_reconnect: bool,
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_tet_system(mut self, tet_system: impl Into<String>) -> Self {
        self.tet_system = tet_system.into();
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Delay between attempts; zero means unset.
    pub fn effective_reconnect_delay(&self) -> Duration {
        if self.reconnect_delay.is_zero() {
            DEFAULT_RECONNECT_DELAY
        } else {
            self.reconnect_delay
        }
    }

    /// Reconnect budget; zero means unset.
    pub fn effective_max_reconnect_attempts(&self) -> u32 {
        match self.max_reconnect_attempts {
            0 => DEFAULT_MAX_RECONNECT_ATTEMPTS,
            n => n,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            tet_system: defaults::DEFAULT_TET_SYSTEM.to_string(),
            auto_reconnect: true,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Snapshot of the supervisor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientStatus {
    pub phase: ConnectionPhase,
    pub reconnect_attempts: u32,
    /// No further connect attempt will happen until `reconnect()`.
    pub terminal: bool,
}

/// Lifecycle notifications published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Error(String),
    Message(ServerMessage),
}

#[derive(Debug)]
enum Control {
    Disconnect,
    Reconnect,
}

type SharedWriter = Arc<Mutex<Option<mpsc::UnboundedSender<LinkCommand>>>>;

/// A bridge connection that reconnects on its own.
///
/// Construction spawns a supervisor task, so it must happen inside a
/// tokio runtime. Dropping the client stops the supervisor and closes
/// the link.
pub struct ReconnectingClient {
    tet_system: String,
    status: watch::Receiver<ClientStatus>,
    events: broadcast::Sender<ClientEvent>,
    control: mpsc::UnboundedSender<Control>,
    writer: SharedWriter,
    last_timestamp: AtomicI64,
}

impl ReconnectingClient {
    /// Start a client that opens links through `connector`.
    pub fn start<C>(connector: C, options: ClientOptions) -> Self
    where
        C: SocketConnector + 'static,
    {
        let (status_tx, status) = watch::channel(ClientStatus::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (control, control_rx) = mpsc::unbounded_channel();
        let writer: SharedWriter = Arc::new(Mutex::new(None));

        let supervisor = Supervisor {
            connector: Arc::new(connector),
            url: options.url.clone(),
            auto_reconnect: options.auto_reconnect,
            reconnect_delay: options.effective_reconnect_delay(),
            max_reconnect_attempts: options.effective_max_reconnect_attempts(),
            attempts: 0,
            phase: ConnectionPhase::Disconnected,
            status: status_tx,
            events: events.clone(),
            control: control_rx,
            writer: Arc::clone(&writer),
        };
        tokio::spawn(supervisor.run());

        Self {
            tet_system: options.tet_system,
            status,
            events,
            control,
            writer,
            last_timestamp: AtomicI64::new(0),
        }
    }

    /// Start a client over a real WebSocket connection.
    pub fn connect(options: ClientOptions) -> Self {
        Self::start(WebSocketConnector::new(), options)
    }

    pub fn tet_system(&self) -> &str {
        &self.tet_system
    }

    /// Current status.
    pub fn current_status(&self) -> ClientStatus {
        *self.status.borrow()
    }

    /// Watch for status changes.
    pub fn status(&self) -> watch::Receiver<ClientStatus> {
        self.status.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.current_status().phase.is_connected()
    }

    /// Subscribe to lifecycle notifications and bridge messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Stop reconnecting and close the active link.
    pub fn disconnect(&self) {
        let _ = self.control.send(Control::Disconnect);
    }

    /// Re-enable auto-reconnect, reset the attempt counter, and connect again.
    pub fn reconnect(&self) {
        let _ = self.control.send(Control::Reconnect);
    }

    /// Hand one event to the link writer.
    ///
    /// # Errors
    ///
    /// - `NotConnected` when no link is open
    /// - `Serialize` when the event cannot be encoded
    /// - `LinkClosed` when the link writer has already gone away
    pub fn try_send(&self, event: &KeyboardEvent) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(ClientError::NotConnected)?;

        let frame = serde_json::to_string(event)?;
        writer
            .send(LinkCommand::Text(frame))
            .map_err(|_| ClientError::LinkClosed)
    }

    /// Send one event, returning whether it was handed to the link.
    pub fn send(&self, event: &KeyboardEvent) -> bool {
        match self.try_send(event) {
            Ok(()) => true,
            Err(ClientError::NotConnected) => {
                tracing::warn!(event_type = event.type_name(), "Not connected; event not sent");
                false
            }
            Err(e) => {
                tracing::error!(event_type = event.type_name(), error = %e, "Failed to send event");
                false
            }
        }
    }

    pub fn send_note_on(
        &self,
        note_id: i64,
        frequency: f64,
        velocity: i64,
        note_name: &str,
        octave: i64,
    ) -> bool {
        self.send(&KeyboardEvent::NoteOn(NoteOn {
            note_id: Some(note_id),
            frequency: Some(frequency),
            velocity: Some(velocity),
            note_name: Some(note_name.to_string()),
            octave: Some(octave),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_note_off(&self, note_id: i64, frequency: f64, note_name: &str) -> bool {
        self.send(&KeyboardEvent::NoteOff(NoteOff {
            note_id: Some(note_id),
            frequency: Some(frequency),
            velocity: Some(0),
            note_name: Some(note_name.to_string()),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_frequency_data(
        &self,
        frequency: f64,
        note_name: &str,
        tet_position: i64,
        octave: i64,
    ) -> bool {
        self.send(&KeyboardEvent::FrequencyData(FrequencyData {
            frequency: Some(frequency),
            note_name: Some(note_name.to_string()),
            tet_position: Some(tet_position),
            octave: Some(octave),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_polyphony_update(&self, active_notes: &[NoteRecord]) -> bool {
        self.send(&KeyboardEvent::PolyphonyUpdate(PolyphonyUpdate {
            active_notes_count: Some(active_notes.len() as i64),
            active_frequencies: active_notes
                .iter()
                .map(|n| n.frequency.unwrap_or_default())
                .collect(),
            active_note_ids: active_notes.iter().map(|n| n.id.unwrap_or_default()).collect(),
            active_notes: active_notes.to_vec(),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_scale_change(&self, scale_name: &str, scale_notes: &[Value]) -> bool {
        self.send(&KeyboardEvent::ScaleChange(ScaleChange {
            scale_name: Some(scale_name.to_string()),
            scale_notes: scale_notes.to_vec(),
            scale_length: Some(scale_notes.len() as i64),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_octave_change(&self, octave_shift: i64) -> bool {
        self.send(&KeyboardEvent::OctaveChange(OctaveChange {
            octave_shift: Some(octave_shift),
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    pub fn send_custom_message(&self, osc_address: &str, args: Vec<CustomArg>) -> bool {
        self.send(&KeyboardEvent::Custom(CustomMessage {
            osc_address: Some(osc_address.to_string()),
            args,
            tet_system: Some(self.tet_system.clone()),
            timestamp: Some(self.stamp()),
        }))
    }

    /// Current time in ms, never earlier than a previous stamp.
    fn stamp(&self) -> i64 {
        let now = Timestamp::now().as_millis();
        self.last_timestamp.fetch_max(now, Ordering::SeqCst).max(now)
    }
}

impl std::fmt::Debug for ReconnectingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectingClient")
            .field("tet_system", &self.tet_system)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

/// What the supervisor does next.
enum Step {
    Connect,
    WaitToRetry,
    Idle,
    Shutdown,
}

enum ConnectOutcome {
    Opened(Result<ClientLink, ClientError>),
    Control(Option<Control>),
}

enum LinkOutcome {
    Link(Option<LinkEvent>),
    Control(Option<Control>),
}

enum WaitOutcome {
    Elapsed,
    Control(Option<Control>),
}

struct Supervisor<C> {
    connector: Arc<C>,
    url: String,
    auto_reconnect: bool,
    reconnect_delay: Duration,
    max_reconnect_attempts: u32,
    attempts: u32,
    phase: ConnectionPhase,
    status: watch::Sender<ClientStatus>,
    events: broadcast::Sender<ClientEvent>,
    control: mpsc::UnboundedReceiver<Control>,
    writer: SharedWriter,
}

impl<C: SocketConnector + 'static> Supervisor<C> {
    async fn run(mut self) {
        let mut step = Step::Connect;
        loop {
            step = match step {
                Step::Connect => self.connect_once().await,
                Step::WaitToRetry => self.wait_to_retry().await,
                Step::Idle => self.idle().await,
                Step::Shutdown => break,
            };
        }
        self.set_writer(None);
        tracing::debug!(url = %self.url, "Client supervisor stopped");
    }

    async fn connect_once(&mut self) -> Step {
        self.enter(ConnectionPhase::Connecting, false);
        tracing::info!(url = %self.url, "Connecting to bridge");

        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let outcome = tokio::select! {
            result = connector.connect(&url) => ConnectOutcome::Opened(result),
            control = self.control.recv() => ConnectOutcome::Control(control),
        };

        match outcome {
            ConnectOutcome::Opened(Ok(link)) => {
                self.attempts = 0;
                self.set_writer(Some(link.outbound.clone()));
                self.enter(ConnectionPhase::Connected, false);
                tracing::info!(url = %self.url, "Connected to bridge");
                self.publish(ClientEvent::Connected);
                self.pump(link).await
            }
            ConnectOutcome::Opened(Err(e)) => {
                tracing::warn!(url = %self.url, error = %e, "Connection attempt failed");
                self.publish(ClientEvent::Error(e.to_string()));
                self.enter(ConnectionPhase::Disconnected, false);
                self.publish(ClientEvent::Disconnected);
                self.after_disconnect()
            }
            ConnectOutcome::Control(control) => {
                self.enter(ConnectionPhase::Disconnected, false);
                self.on_control(control)
            }
        }
    }

    /// Drive an open link until it closes or the caller intervenes.
    async fn pump(&mut self, mut link: ClientLink) -> Step {
        loop {
            let outcome = tokio::select! {
                event = link.inbound.recv() => LinkOutcome::Link(event),
                control = self.control.recv() => LinkOutcome::Control(control),
            };

            match outcome {
                LinkOutcome::Link(Some(LinkEvent::Text(text))) => {
                    match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(message) => self.publish(ClientEvent::Message(message)),
                        Err(e) => tracing::error!(error = %e, "Failed to parse bridge message"),
                    }
                }
                LinkOutcome::Link(Some(LinkEvent::Error(e))) => {
                    tracing::error!(url = %self.url, error = %e, "Bridge link failed");
                    self.publish(ClientEvent::Error(e));
                    break;
                }
                LinkOutcome::Link(Some(LinkEvent::Closed)) | LinkOutcome::Link(None) => break,
                LinkOutcome::Control(control) => {
                    let _ = link.outbound.send(LinkCommand::Close);
                    self.close_link();
                    return self.on_control(control);
                }
            }
        }

        tracing::info!(url = %self.url, "Bridge connection closed");
        self.close_link();
        self.after_disconnect()
    }

    async fn wait_to_retry(&mut self) -> Step {
        self.attempts += 1;
        self.enter(ConnectionPhase::Disconnected, false);
        tracing::info!(
            attempt = self.attempts,
            max_attempts = self.max_reconnect_attempts,
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let outcome = tokio::select! {
            _ = tokio::time::sleep(self.reconnect_delay) => WaitOutcome::Elapsed,
            control = self.control.recv() => WaitOutcome::Control(control),
        };

        match outcome {
            WaitOutcome::Elapsed => Step::Connect,
            WaitOutcome::Control(control) => self.on_control(control),
        }
    }

    async fn idle(&mut self) -> Step {
        self.enter(ConnectionPhase::Disconnected, true);
        let control = self.control.recv().await;
        self.on_control(control)
    }

    fn on_control(&mut self, control: Option<Control>) -> Step {
        match control {
            Some(Control::Disconnect) => {
                self.auto_reconnect = false;
                Step::Idle
            }
            Some(Control::Reconnect) => {
                self.auto_reconnect = true;
                self.attempts = 0;
                Step::Connect
            }
            None => Step::Shutdown,
        }
    }

    fn after_disconnect(&self) -> Step {
        if self.auto_reconnect && self.attempts < self.max_reconnect_attempts {
            Step::WaitToRetry
        } else {
            if self.auto_reconnect {
                tracing::warn!(
                    attempts = self.attempts,
                    "Reconnect attempts exhausted; call reconnect() to try again"
                );
            }
            Step::Idle
        }
    }

    fn close_link(&mut self) {
        self.set_writer(None);
        self.enter(ConnectionPhase::Disconnected, false);
        self.publish(ClientEvent::Disconnected);
    }

    fn enter(&mut self, phase: ConnectionPhase, terminal: bool) {
        if phase != self.phase {
            match self.phase.transition_to(phase) {
                Ok(next) => self.phase = next,
                Err(e) => {
                    tracing::error!(error = %e, "Invalid client phase change");
                    return;
                }
            }
        }
        self.status.send_replace(ClientStatus {
            phase: self.phase,
            reconnect_attempts: self.attempts,
            terminal,
        });
    }

    fn set_writer(&self, writer: Option<mpsc::UnboundedSender<LinkCommand>>) {
        *self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = writer;
    }

    fn publish(&self, event: ClientEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
