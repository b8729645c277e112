//! Application state management
//!
//! `AppState` mirrors what the relay reports so the page can render status
//! and decide which controls are enabled. It never changes the session state
//! itself: buttons send commands, and the state follows relay events.

use crate::editor::CodeEditor;
use crate::relay::{RelayEvent, RelayHandle, SessionState};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, warn};

const MAX_LOG_LINES: usize = 100;

/// Bounded list of recent lines, newest last
#[derive(Debug, Clone, Default)]
pub struct RecentLines {
    lines: VecDeque<String>,
}

impl RecentLines {
    pub fn push(&mut self, line: String) {
        if self.lines.len() >= MAX_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&String> {
        self.lines.back()
    }
}

/// Central application state
pub struct AppState {
    /// Session state as last reported by the relay
    pub session_state: SessionState,

    /// Reason the assistant is unavailable, if credentials are missing
    pub config_error: Option<String>,

    /// Time of the last editor change; written from the editor listener
    pub last_code_update: Arc<Mutex<DateTime<Utc>>>,

    /// Time the last debounced code update went out
    pub last_broadcast: Option<DateTime<Utc>>,

    /// Last start failure or service error
    pub last_error: Option<String>,

    /// Interviewer transcript lines
    pub transcript: RecentLines,

    /// Relay activity shown under the controls
    pub activity: RecentLines,

    relay: Option<RelayHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State with no relay attached; every control stays disabled
    pub fn new() -> Self {
        Self {
            session_state: SessionState::Idle,
            config_error: None,
            last_code_update: Arc::new(Mutex::new(Utc::now())),
            last_broadcast: None,
            last_error: None,
            transcript: RecentLines::default(),
            activity: RecentLines::default(),
            relay: None,
        }
    }

    /// State driving `relay`
    pub fn with_relay(relay: RelayHandle) -> Self {
        let mut state = Self::new();
        state.relay = Some(relay);
        state
    }

    pub fn is_configured(&self) -> bool {
        self.relay.as_ref().is_some_and(|r| r.is_configured()) && self.config_error.is_none()
    }

    pub fn can_start(&self) -> bool {
        self.is_configured() && self.session_state.is_idle()
    }

    pub fn can_end(&self) -> bool {
        self.relay.is_some() && !self.session_state.is_idle()
    }

    pub fn can_share(&self) -> bool {
        self.relay.is_some() && self.session_state.is_active()
    }

    pub fn last_code_update(&self) -> DateTime<Utc> {
        *self.last_code_update.lock()
    }

    /// Forward editor notifications to the relay
    pub fn connect_editor(&self, editor: &mut CodeEditor) {
        let relay = self.relay.clone();
        let last_update = Arc::clone(&self.last_code_update);
        editor.on_content_changed(move |code| {
            *last_update.lock() = Utc::now();
            if let Some(relay) = &relay {
                if let Err(e) = relay.content_changed(code) {
                    warn!("Failed to forward editor change: {}", e);
                }
            }
        });

        let relay = self.relay.clone();
        editor.on_cursor_moved(move |position| {
            if let Some(relay) = &relay {
                let _ = relay.cursor_moved(position);
            }
        });
    }

    pub fn start_interview(&mut self) {
        if !self.can_start() {
            return;
        }
        self.last_error = None;
        self.activity.push("Starting interview...".to_string());
        self.command(|relay| relay.start());
    }

    pub fn end_interview(&mut self) {
        if !self.can_end() {
            return;
        }
        self.activity.push("Ending interview...".to_string());
        self.command(|relay| relay.end());
    }

    pub fn share_code(&mut self) {
        if !self.can_share() {
            return;
        }
        self.activity.push("Shared current code".to_string());
        self.command(|relay| relay.share_code());
    }

    /// Stop the relay; used when the window closes
    pub fn shutdown(&mut self) {
        self.command(|relay| relay.shutdown());
    }

    /// Apply pending relay events
    pub fn poll_events(&mut self) {
        let events: Vec<RelayEvent> = match &self.relay {
            Some(relay) => std::iter::from_fn(|| relay.try_recv_event()).collect(),
            None => Vec::new(),
        };

        for event in events {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::StateChanged(state) => {
                self.session_state = state;
                self.activity.push(format!("Interview status: {}", state));
            }
            RelayEvent::ConfigurationError(e) => {
                self.config_error = Some(e);
            }
            RelayEvent::StartFailed(e) => {
                self.activity.push(format!("Failed to start: {}", e));
                self.last_error = Some(e);
            }
            RelayEvent::InitialContextSent => {
                self.activity.push("Initial context sent".to_string());
            }
            RelayEvent::CodeUpdateSent { at, bytes } => {
                self.last_broadcast = Some(at);
                self.activity.push(format!("Code update sent ({} bytes)", bytes));
            }
            RelayEvent::CodeUpdateDropped => {
                self.activity
                    .push("Code update not sent: interview ended first".to_string());
            }
            RelayEvent::AssistantMessage(line) => {
                self.transcript.push(line);
            }
            RelayEvent::ServiceError(e) => {
                self.activity.push(format!("Assistant error: {}", e));
                self.last_error = Some(e);
            }
            RelayEvent::Shutdown => {
                self.session_state = SessionState::Idle;
            }
        }
    }

    /// Run a relay command. A relay that can no longer take commands is
    /// detached, which disables every control.
    fn command(&mut self, send: impl FnOnce(&RelayHandle) -> crate::Result<()>) {
        let Some(relay) = &self.relay else {
            return;
        };
        let Err(e) = send(relay) else {
            return;
        };

        self.last_error = Some(e.user_message());
        if e.is_recoverable() {
            warn!("{}", e);
        } else {
            error!("{}; detaching from the session relay", e);
            self.relay = None;
            self.session_state = SessionState::Idle;
        }
    }
}
