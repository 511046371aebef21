//! Keyboard integration - Forwards UI actions to the bridge.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::ReconnectingClient;
use crate::domain::events::{defaults::DEFAULT_TET_SYSTEM, NoteRecord};
use crate::domain::foundation::Timestamp;
use crate::ports::{KeyboardObserver, OctaveDirection};

/// Extract `"<digits>-TET"` from a page title, or fall back to 31-TET.
///
/// The first `-TET` preceded by at least one digit wins.
pub fn detect_tet_system(title: &str) -> String {
    for (idx, _) in title.match_indices("-TET") {
        let digits = title[..idx]
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits > 0 {
            return format!("{}-TET", &title[idx - digits..idx]);
        }
    }
    DEFAULT_TET_SYSTEM.to_string()
}

/// Observers registered with the keyboard UI.
#[derive(Default)]
pub struct KeyboardListeners {
    observers: Vec<Arc<dyn KeyboardObserver>>,
}

impl KeyboardListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn KeyboardObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify_play_note(&self, frequency: f64, note_id: i64, note_name: &str, velocity: i64) {
        for observer in &self.observers {
            observer.on_play_note(frequency, note_id, note_name, velocity);
        }
    }

    pub fn notify_stop_note(&self, frequency: f64, note_id: i64, note_name: &str) {
        for observer in &self.observers {
            observer.on_stop_note(frequency, note_id, note_name);
        }
    }

    pub fn notify_transpose_octave(&self, direction: OctaveDirection) {
        for observer in &self.observers {
            observer.on_transpose_octave(direction);
        }
    }

    pub fn notify_apply_scale(&self, scale_name: &str, scale_notes: &[Value]) {
        for observer in &self.observers {
            observer.on_apply_scale(scale_name, scale_notes);
        }
    }
}

#[derive(Debug)]
struct KeyboardState {
    octave_shift: i64,
    current_scale: String,
    // insertion-ordered; a replayed id keeps its slot
    active_notes: Vec<NoteRecord>,
}

/// Mirrors keyboard actions onto a [`ReconnectingClient`].
///
/// Active notes survive a disconnect; a note released while offline is
/// still removed locally, so polyphony resumes from the keyboard's view.
pub struct KeyboardBridge {
    client: Arc<ReconnectingClient>,
    state: Mutex<KeyboardState>,
}

impl KeyboardBridge {
    pub fn new(client: Arc<ReconnectingClient>) -> Self {
        Self {
            client,
            state: Mutex::new(KeyboardState {
                octave_shift: 0,
                current_scale: "none".to_string(),
                active_notes: Vec::new(),
            }),
        }
    }

    /// Create a bridge and register it with `listeners`.
    pub fn attach(client: Arc<ReconnectingClient>, listeners: &mut KeyboardListeners) -> Arc<Self> {
        let bridge = Arc::new(Self::new(client));
        listeners.register(bridge.clone());
        bridge
    }

    pub fn client(&self) -> &ReconnectingClient {
        &self.client
    }

    pub fn octave_shift(&self) -> i64 {
        self.lock().octave_shift
    }

    pub fn current_scale(&self) -> String {
        self.lock().current_scale.clone()
    }

    pub fn active_notes(&self) -> Vec<NoteRecord> {
        self.lock().active_notes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, KeyboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyboardObserver for KeyboardBridge {
    fn on_play_note(&self, frequency: f64, note_id: i64, note_name: &str, velocity: i64) {
        let mut state = self.lock();
        self.client
            .send_note_on(note_id, frequency, velocity, note_name, state.octave_shift);

        let record = NoteRecord {
            id: Some(note_id),
            frequency: Some(frequency),
            note_name: Some(note_name.to_string()),
            velocity: Some(velocity),
            start_time: Some(Timestamp::now().as_millis()),
        };
        match state.active_notes.iter_mut().find(|n| n.id == Some(note_id)) {
            Some(slot) => *slot = record,
            None => state.active_notes.push(record),
        }

        self.client.send_polyphony_update(&state.active_notes);
    }

    fn on_stop_note(&self, frequency: f64, note_id: i64, note_name: &str) {
        let mut state = self.lock();
        self.client.send_note_off(note_id, frequency, note_name);
        state.active_notes.retain(|n| n.id != Some(note_id));
        self.client.send_polyphony_update(&state.active_notes);
    }

    fn on_transpose_octave(&self, direction: OctaveDirection) {
        let mut state = self.lock();
        state.octave_shift = match direction {
            OctaveDirection::Up => state.octave_shift + 1,
            OctaveDirection::Down => state.octave_shift - 1,
            OctaveDirection::Reset => 0,
        };
        self.client.send_octave_change(state.octave_shift);
    }

    fn on_apply_scale(&self, scale_name: &str, scale_notes: &[Value]) {
        let mut state = self.lock();
        state.current_scale = scale_name.to_string();
        self.client.send_scale_change(scale_name, scale_notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, ClientOptions, ConnectionPhase};
    use crate::ports::{ClientLink, LinkCommand, SocketConnector};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    #[test]
    fn detects_tet_from_title() {
        assert_eq!(detect_tet_system("Microtonal Keyboard 19-TET"), "19-TET");
        assert_eq!(detect_tet_system("53-TET Just Intonation"), "53-TET");
        assert_eq!(detect_tet_system("Keyboard"), "31-TET");
        assert_eq!(detect_tet_system("-TET then 41-TET"), "41-TET");
    }

    struct OpenConnector {
        frames: mpsc::UnboundedSender<mpsc::UnboundedReceiver<LinkCommand>>,
    }

    #[async_trait]
    impl SocketConnector for OpenConnector {
        async fn connect(&self, _url: &str) -> Result<ClientLink, ClientError> {
            let (outbound, commands) = mpsc::unbounded_channel();
            // a parked task holds the event sender so the link stays open
            let (events, inbound) = mpsc::unbounded_channel();
            tokio::spawn(async move {
                let _events = events;
                std::future::pending::<()>().await;
            });
            let _ = self.frames.send(commands);
            Ok(ClientLink { outbound, inbound })
        }
    }

    async fn connected_bridge() -> (
        Arc<KeyboardBridge>,
        KeyboardListeners,
        mpsc::UnboundedReceiver<LinkCommand>,
    ) {
        let (frames_tx, mut frames) = mpsc::unbounded_channel();
        let client = ReconnectingClient::start(
            OpenConnector { frames: frames_tx },
            ClientOptions::default().with_tet_system("41-TET"),
        );
        client
            .status()
            .wait_for(|s| s.phase == ConnectionPhase::Connected)
            .await
            .unwrap();
        let commands = frames.recv().await.unwrap();

        let mut listeners = KeyboardListeners::new();
        let bridge = KeyboardBridge::attach(Arc::new(client), &mut listeners);
        (bridge, listeners, commands)
    }

    fn next_json(commands: &mut mpsc::UnboundedReceiver<LinkCommand>) -> Value {
        match commands.try_recv() {
            Ok(LinkCommand::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn play_sends_note_on_with_octave_shift_then_polyphony() {
        let (bridge, listeners, mut commands) = connected_bridge().await;

        listeners.notify_transpose_octave(OctaveDirection::Up);
        listeners.notify_play_note(440.0, 12, "A", 100);

        let octave = next_json(&mut commands);
        assert_eq!(octave["type"], "octave_change");
        assert_eq!(octave["octaveShift"], 1);

        let note_on = next_json(&mut commands);
        assert_eq!(note_on["type"], "note_on");
        assert_eq!(note_on["octave"], 1);
        assert_eq!(note_on["tetSystem"], "41-TET");

        let polyphony = next_json(&mut commands);
        assert_eq!(polyphony["type"], "polyphony_update");
        assert_eq!(polyphony["activeNoteIds"], serde_json::json!([12]));
        assert_eq!(bridge.active_notes().len(), 1);
    }

    #[tokio::test]
    async fn stop_removes_note_and_updates_polyphony() {
        let (bridge, listeners, mut commands) = connected_bridge().await;

        listeners.notify_play_note(261.63, 1, "C", 127);
        listeners.notify_play_note(329.63, 2, "E", 127);
        listeners.notify_stop_note(261.63, 1, "C");

        for _ in 0..4 {
            next_json(&mut commands);
        }
        let note_off = next_json(&mut commands);
        assert_eq!(note_off["type"], "note_off");
        assert_eq!(note_off["velocity"], 0);

        let polyphony = next_json(&mut commands);
        assert_eq!(polyphony["activeNotesCount"], 1);
        assert_eq!(polyphony["activeNoteIds"], serde_json::json!([2]));
        assert_eq!(bridge.active_notes()[0].id, Some(2));
    }

    #[tokio::test]
    async fn replayed_note_keeps_its_position() {
        let (bridge, listeners, _commands) = connected_bridge().await;

        listeners.notify_play_note(261.63, 1, "C", 127);
        listeners.notify_play_note(329.63, 2, "E", 127);
        listeners.notify_play_note(262.0, 1, "C", 64);

        let ids: Vec<_> = bridge.active_notes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert_eq!(bridge.active_notes()[0].velocity, Some(64));
    }

    #[tokio::test]
    async fn transpose_tracks_shift() {
        let (bridge, listeners, _commands) = connected_bridge().await;

        listeners.notify_transpose_octave(OctaveDirection::Down);
        listeners.notify_transpose_octave(OctaveDirection::Down);
        assert_eq!(bridge.octave_shift(), -2);

        listeners.notify_transpose_octave(OctaveDirection::Reset);
        assert_eq!(bridge.octave_shift(), 0);
    }

    #[tokio::test]
    async fn apply_scale_records_and_sends() {
        let (bridge, listeners, mut commands) = connected_bridge().await;
        assert_eq!(bridge.current_scale(), "none");

        listeners.notify_apply_scale("major", &[Value::from(0), Value::from(5)]);

        assert_eq!(bridge.current_scale(), "major");
        let scale = next_json(&mut commands);
        assert_eq!(scale["scaleName"], "major");
        assert_eq!(scale["scaleLength"], 2);
    }

    #[tokio::test]
    async fn active_notes_are_kept_while_offline() {
        let (bridge, listeners, _commands) = connected_bridge().await;
        listeners.notify_play_note(440.0, 9, "A", 127);

        bridge.client().disconnect();
        bridge
            .client()
            .status()
            .wait_for(|s| s.terminal)
            .await
            .unwrap();
        listeners.notify_play_note(220.0, 10, "A", 127);

        assert_eq!(bridge.active_notes().len(), 2);
    }
}
