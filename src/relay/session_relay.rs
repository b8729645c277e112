//! Session relay
//!
//! Owns the call state machine and decides what the interviewer sees:
//! Idle -> Connecting -> Active -> Idle. Editor changes are debounced into
//! code updates, cursor moves are forwarded immediately, and manual shares
//! bypass the debounce window.
//!
//! The relay runs as a single task. The UI holds a [`RelayHandle`] to send
//! commands and poll [`RelayEvent`]s; every piece of relay state is touched
//! only from inside `run`. Starting a call is the one slow operation, so it
//! runs on its own task and its outcome is folded back into the loop; End and
//! Shutdown cancel it.

use crate::editor::{CodeSnapshot, CursorPosition};
use crate::relay::config::RelayConfig;
use crate::relay::session::{Session, SessionState};
use crate::relay::timer::{sleep_until_deadline, Debouncer};
use crate::service::{CallOptions, OutgoingMessage, ServiceEvent, VoiceService};
use crate::{MocktalkError, Result};
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands that can be sent to the relay
#[derive(Debug, Clone)]
pub enum RelayCommand {
    /// Start a call (user pressed Start)
    Start,

    /// End the call (user pressed End)
    End,

    /// Share the current code right away
    ShareCode,

    /// The editor content changed
    ContentChanged(String),

    /// The editor caret moved
    CursorMoved(CursorPosition),

    /// Stop any call and exit the relay loop
    Shutdown,
}

/// Events emitted by the relay for the UI
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// The session state machine moved
    StateChanged(SessionState),

    /// Credentials are missing; the relay will never connect
    ConfigurationError(String),

    /// The start request was rejected
    StartFailed(String),

    /// Initial context delivered after the settle delay
    InitialContextSent,

    /// A debounced code update went out
    CodeUpdateSent { at: DateTime<Utc>, bytes: usize },

    /// A pending code update was discarded because the call ended first
    CodeUpdateDropped,

    /// A final transcript line from the interviewer
    AssistantMessage(String),

    /// The voice service reported an error
    ServiceError(String),

    /// The relay loop has exited
    Shutdown,
}

/// Handle for controlling the relay from the UI
#[derive(Clone)]
pub struct RelayHandle {
    command_tx: UnboundedSender<RelayCommand>,
    event_rx: Receiver<RelayEvent>,
    configured: bool,
}

impl RelayHandle {
    /// Send a command to the relay
    pub fn send_command(&self, cmd: RelayCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| MocktalkError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn start(&self) -> Result<()> {
        self.send_command(RelayCommand::Start)
    }

    pub fn end(&self) -> Result<()> {
        self.send_command(RelayCommand::End)
    }

    pub fn share_code(&self) -> Result<()> {
        self.send_command(RelayCommand::ShareCode)
    }

    pub fn content_changed(&self, code: impl Into<String>) -> Result<()> {
        self.send_command(RelayCommand::ContentChanged(code.into()))
    }

    pub fn cursor_moved(&self, position: CursorPosition) -> Result<()> {
        self.send_command(RelayCommand::CursorMoved(position))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send_command(RelayCommand::Shutdown)
    }

    /// Try to receive an event from the relay
    pub fn try_recv_event(&self) -> Option<RelayEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Whether the relay has the credentials it needs to connect
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Call state machine plus debounced code broadcasting
pub struct SessionRelay {
    config: RelayConfig,
    service: Arc<dyn VoiceService>,
    command_rx: UnboundedReceiver<RelayCommand>,
    service_rx: UnboundedReceiver<ServiceEvent>,
    event_tx: Sender<RelayEvent>,
    /// At most one call at a time
    session: Option<Session>,
    snapshot: CodeSnapshot,
    code_updates: Debouncer<String>,
    settle: Debouncer<()>,
    /// In-flight `service.start` for the Connecting session
    starting: Option<JoinHandle<Result<()>>>,
    /// Set when credentials are missing
    config_error: Option<MocktalkError>,
}

impl SessionRelay {
    /// Create a relay driving `service`
    ///
    /// Missing credentials are logged here, once. The relay is still returned
    /// so the UI can run, but it will ignore every start request.
    pub fn new(config: RelayConfig, mut service: Box<dyn VoiceService>) -> (Self, RelayHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (service_tx, service_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();

        let config_error = config.validate().err();
        if let Some(e) = &config_error {
            error!("Voice assistant disabled: {}", e);
            let _ = event_tx.send(RelayEvent::ConfigurationError(e.to_string()));
        }

        service.subscribe(service_tx);

        let handle = RelayHandle {
            command_tx,
            event_rx,
            configured: config_error.is_none(),
        };

        let relay = Self {
            snapshot: CodeSnapshot::new(config.problem.starter_code),
            code_updates: Debouncer::new(config.debounce_window),
            settle: Debouncer::new(config.settle_delay),
            starting: None,
            config,
            service: Arc::from(service),
            command_rx,
            service_rx,
            event_tx,
            session: None,
            config_error,
        };

        (relay, handle)
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(SessionState::Idle)
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Session relay started");

        loop {
            let settle_deadline = self.settle.deadline();
            let code_deadline = self.code_updates.deadline();

            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => match cmd {
                    Some(RelayCommand::Shutdown) => {
                        info!("Session relay shutdown requested");
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        debug!("All relay handles dropped");
                        break;
                    }
                },
                result = join_start(&mut self.starting) => self.on_start_finished(result),
                Some(event) = self.service_rx.recv() => self.handle_service_event(event),
                _ = sleep_until_deadline(settle_deadline) => self.on_settled(),
                _ = sleep_until_deadline(code_deadline) => self.on_debounce_elapsed(),
            }
        }

        self.cancel_start().await;
        if self.session.is_some() {
            self.service.stop().await;
            self.session = None;
        }
        self.settle.cancel();
        self.code_updates.cancel();
        self.emit(RelayEvent::Shutdown);
        info!("Session relay stopped");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Start => self.start(),
            RelayCommand::End => self.end().await,
            RelayCommand::ShareCode => self.share_code(),
            RelayCommand::ContentChanged(code) => {
                self.snapshot.update(code.clone());
                if self.state().is_active() {
                    self.code_updates.reset(code);
                }
            }
            RelayCommand::CursorMoved(position) => {
                if self.state().is_active() {
                    self.send(OutgoingMessage::CursorActivity { timestamp: Utc::now() });
                } else {
                    debug!("Cursor moved to {} while not connected", position);
                }
            }
            RelayCommand::Shutdown => {}
        }
    }

    fn start(&mut self) {
        if self.config_error.is_some() {
            debug!("Start ignored: voice assistant is not configured");
            return;
        }
        if self.session.is_some() {
            debug!("Start ignored: session already {}", self.state());
            return;
        }

        let Some(assistant_id) = self.config.assistant_id.clone() else {
            return;
        };

        let session = Session::new();
        let call = session.id;
        info!("Starting voice call (session {})", call);
        self.session = Some(session);
        self.emit(RelayEvent::StateChanged(SessionState::Connecting));

        let problem = self.config.problem;
        let options = CallOptions::technical_interview(problem.statement, problem.language);
        let service = Arc::clone(&self.service);
        self.starting = Some(tokio::spawn(async move {
            service.start(call, &assistant_id, &options).await
        }));
    }

    /// Outcome of the start task; only a rejection needs handling here
    fn on_start_finished(&mut self, result: Result<()>) {
        match result {
            Ok(()) => debug!("Voice call start accepted"),
            Err(e) => {
                error!("Failed to start voice call: {}", e);
                self.session = None;
                self.settle.cancel();
                self.emit(RelayEvent::StartFailed(e.to_string()));
                self.emit(RelayEvent::StateChanged(SessionState::Idle));
            }
        }
    }

    /// Abort an in-flight start and wait for it to unwind
    async fn cancel_start(&mut self) {
        if let Some(task) = self.starting.take() {
            task.abort();
            let _ = task.await;
            debug!("Cancelled pending call start");
        }
    }

    async fn end(&mut self) {
        match self.state() {
            SessionState::Idle => debug!("End ignored: no session"),
            SessionState::Connecting => {
                info!("Cancelling voice call before it connected");
                self.cancel_start().await;
                self.service.stop().await;
                self.enter_idle();
            }
            SessionState::Active => {
                info!("Ending voice call");
                self.send(OutgoingMessage::EndOfSession);
                self.service.stop().await;
                self.enter_idle();
            }
        }
    }

    fn share_code(&mut self) {
        if !self.state().is_active() {
            debug!("Share ignored: not connected");
            return;
        }
        self.send(OutgoingMessage::ManualShare {
            problem: self.config.problem,
            code: self.snapshot.content().to_string(),
        });
        info!("Shared current code ({} bytes)", self.snapshot.len());
    }

    fn handle_service_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::CallStart(call) => {
                if !self.is_current_call(call) || self.state() != SessionState::Connecting {
                    warn!("Ignoring call-start for {} in state {}", call, self.state());
                    return;
                }
                if let Some(session) = self.session.as_mut() {
                    session.activate();
                }
                info!("Voice call started");
                self.settle.reset(());
                self.emit(RelayEvent::StateChanged(SessionState::Active));
            }
            ServiceEvent::CallEnd(call) => {
                if self.is_current_call(call) {
                    info!("Voice call ended");
                    self.enter_idle();
                } else {
                    debug!("Ignoring call-end for {}: not the current call", call);
                }
            }
            ServiceEvent::Error(e) => {
                error!("Voice service error: {}", e);
                self.emit(RelayEvent::ServiceError(e));
            }
            ServiceEvent::Message(message) => {
                debug!("Assistant message: {}", message);
                if let Some(line) = final_transcript(&message) {
                    self.emit(RelayEvent::AssistantMessage(line));
                }
            }
        }
    }

    fn on_settled(&mut self) {
        if self.settle.take_expired().is_none() {
            return;
        }
        if !self.state().is_active() {
            return;
        }
        self.send(OutgoingMessage::InitialContext {
            problem: self.config.problem,
            code: self.snapshot.content().to_string(),
        });
        info!("Initial context sent");
        self.emit(RelayEvent::InitialContextSent);
    }

    fn on_debounce_elapsed(&mut self) {
        let Some(code) = self.code_updates.take_expired() else {
            return;
        };
        if !self.state().is_active() {
            self.report_dropped(code.len());
            return;
        }

        let bytes = code.len();
        let at = Utc::now();
        info!("Sent code update: {}", preview(&code, 100));
        self.send(OutgoingMessage::CodeUpdate {
            problem: self.config.problem,
            code,
            timestamp: at,
        });
        self.emit(RelayEvent::CodeUpdateSent { at, bytes });
    }

    fn is_current_call(&self, call: Uuid) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == call)
    }

    /// Leave the session; pending timers never fire for it
    fn enter_idle(&mut self) {
        if let Some(task) = self.starting.take() {
            task.abort();
        }
        self.session = None;
        self.settle.cancel();
        if let Some(code) = self.code_updates.cancel() {
            self.report_dropped(code.len());
        }
        self.emit(RelayEvent::StateChanged(SessionState::Idle));
    }

    fn report_dropped(&self, bytes: usize) {
        warn!(
            "Dropped pending code update ({} bytes): call ended before it was sent",
            bytes
        );
        self.emit(RelayEvent::CodeUpdateDropped);
    }

    fn send(&self, message: OutgoingMessage) {
        debug!("Sending {} message", message.kind());
        self.service.send(&message);
    }

    fn emit(&self, event: RelayEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Builder for creating a relay
pub struct SessionRelayBuilder {
    config: RelayConfig,
}

impl SessionRelayBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        assistant_id: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(api_key, assistant_id);
        self
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.config.debounce_window = window;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Build the relay around `service`
    pub fn build(self, service: Box<dyn VoiceService>) -> (SessionRelay, RelayHandle) {
        SessionRelay::new(self.config, service)
    }
}

impl Default for SessionRelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the start task, or forever when there is none
async fn join_start(task: &mut Option<JoinHandle<Result<()>>>) -> Result<()> {
    let Some(handle) = task.as_mut() else {
        return std::future::pending().await;
    };
    let joined = handle.await;
    *task = None;
    joined.unwrap_or_else(|e| {
        Err(MocktalkError::ServiceError(format!(
            "call start task failed: {}",
            e
        )))
    })
}

/// Final assistant transcript line, if `message` is one
fn final_transcript(message: &serde_json::Value) -> Option<String> {
    let is_final = message["type"] == "transcript"
        && message["role"] == "assistant"
        && message["transcriptType"] == "final";
    if !is_final {
        return None;
    }
    message["transcript"].as_str().map(str::to_string)
}

fn preview(code: &str, max_chars: usize) -> String {
    let mut chars = code.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
