//! UI automation tests using egui_kittest and AccessKit
//!
//! These tests render the interview page, click its controls through the
//! accessibility tree, and check that commands reach a live relay.

use async_trait::async_trait;
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use mocktalk::editor::{CodeEditor, EditorOptions};
use mocktalk::problem::{Problem, TWO_SUM};
use mocktalk::relay::{RelayConfig, SessionRelay, SessionState};
use mocktalk::service::{
    CallOptions, MessageKind, OutgoingMessage, ServiceEvent, ServiceEventSender, VoiceService,
};
use mocktalk::ui::{AppState, InterviewPage, Theme};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Voice service that connects instantly and records what it is sent
#[derive(Clone, Default)]
struct StubService {
    sent: Arc<Mutex<Vec<OutgoingMessage>>>,
    events: Arc<Mutex<Option<ServiceEventSender>>>,
    current_call: Arc<Mutex<Option<Uuid>>>,
}

impl StubService {
    fn emit(&self, event: ServiceEvent) {
        if let Some(events) = self.events.lock().as_ref() {
            let _ = events.send(event);
        }
    }

    fn count(&self, kind: MessageKind) -> usize {
        self.sent.lock().iter().filter(|m| m.kind() == kind).count()
    }
}

#[async_trait]
impl VoiceService for StubService {
    fn subscribe(&mut self, events: ServiceEventSender) {
        *self.events.lock() = Some(events);
    }

    async fn start(
        &self,
        call: Uuid,
        _assistant_id: &str,
        _options: &CallOptions,
    ) -> mocktalk::Result<()> {
        *self.current_call.lock() = Some(call);
        self.emit(ServiceEvent::CallStart(call));
        Ok(())
    }

    async fn stop(&self) {
        let call = self.current_call.lock().take();
        if let Some(call) = call {
            self.emit(ServiceEvent::CallEnd(call));
        }
    }

    fn send(&self, message: &OutgoingMessage) {
        self.sent.lock().push(message.clone());
    }
}

/// Page state wrapper for testing
struct TestPage {
    state: AppState,
    editor: CodeEditor,
    problem: Problem,
    theme: Theme,
}

impl TestPage {
    fn new(state: AppState) -> Self {
        let mut editor = CodeEditor::new(TWO_SUM.starter_code, EditorOptions::default());
        state.connect_editor(&mut editor);
        Self {
            state,
            editor,
            problem: TWO_SUM,
            theme: Theme::dark(),
        }
    }
}

fn harness(page: TestPage) -> Harness<'static, TestPage> {
    Harness::builder()
        .with_size(egui::Vec2::new(1280.0, 800.0))
        .build_state(
            |ctx, page: &mut TestPage| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    InterviewPage::new(
                        &mut page.state,
                        &mut page.editor,
                        &page.problem,
                        &page.theme,
                    )
                    .show(ui);
                });
            },
            page,
        )
}

/// Start a relay on its own runtime; the runtime must outlive the test body
fn live_relay(config: RelayConfig) -> (tokio::runtime::Runtime, AppState, StubService) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let service = StubService::default();
    let (relay, handle) = SessionRelay::new(config, Box::new(service.clone()));
    runtime.spawn(relay.run());
    (runtime, AppState::with_relay(handle), service)
}

fn fast_config() -> RelayConfig {
    RelayConfig::default()
        .with_credentials("test-key", "test-assistant")
        .with_settle_delay(Duration::from_millis(20))
        .with_debounce_window(Duration::from_millis(100))
}

/// Poll relay events and re-render until `done` holds
fn run_until(harness: &mut Harness<'_, TestPage>, done: impl Fn(&TestPage) -> bool) -> bool {
    for _ in 0..300 {
        harness.state_mut().state.poll_events();
        harness.run();
        if done(harness.state()) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// Test that the page shows the problem, status and controls
#[test]
fn test_page_renders_problem_and_controls() {
    let mut harness = harness(TestPage::new(AppState::new()));
    harness.run();

    let _ = harness.get_by_label("Problem Statement");
    let _ = harness.get_by_label("Problem statement: Two Sum");
    let _ = harness.get_by_label("Interview Status: Disconnected");
    let _ = harness.get_by_label("Code Editor (C++)");
    let _ = harness.get_by_label("Code editor");
    let _ = harness.get_by_label("Start Interview");
    let _ = harness.get_by_label("End Interview");
    let _ = harness.get_by_label("Share Current Code");
}

/// Missing credentials: the error is visible and Start does nothing
#[test]
fn test_unconfigured_start_is_inert() {
    let (_runtime, state, service) = live_relay(RelayConfig::default());
    let mut harness = harness(TestPage::new(state));

    assert!(run_until(&mut harness, |page| page.state.config_error.is_some()));
    let _ = harness.get_by_label(
        "Voice assistant unavailable: Configuration error: missing VAPI_API_KEY, VAPI_ASSISTANT_ID",
    );

    harness.get_by_label("Start Interview").click();
    harness.run();
    std::thread::sleep(Duration::from_millis(100));
    harness.state_mut().state.poll_events();
    harness.run();

    assert_eq!(harness.state().state.session_state, SessionState::Idle);
    assert_eq!(service.count(MessageKind::InitialContext), 0);
}

/// Start, share, end through the buttons
#[test]
fn test_start_share_end_flow() {
    let (_runtime, state, service) = live_relay(fast_config());
    let mut harness = harness(TestPage::new(state));
    harness.run();

    harness.get_by_label("Start Interview").click();
    harness.run();

    assert!(run_until(&mut harness, |page| page.state.session_state.is_active()));
    let _ = harness.get_by_label("Interview Status: Connected");
    assert!(run_until(&mut harness, |_| service.count(MessageKind::InitialContext) == 1));

    harness.get_by_label("Share Current Code").click();
    harness.run();
    assert!(run_until(&mut harness, |_| service.count(MessageKind::ManualShare) == 1));

    harness.get_by_label("End Interview").click();
    harness.run();
    assert!(run_until(&mut harness, |page| page.state.session_state.is_idle()));

    let sent = service.sent.lock().clone();
    assert_eq!(sent.last().map(|m| m.kind()), Some(MessageKind::EndOfSession));
    let _ = harness.get_by_label("Interview Status: Disconnected");
}

/// Typing in the editor produces a debounced code update
#[test]
fn test_typing_reaches_interviewer() {
    let (_runtime, state, service) = live_relay(fast_config());
    let mut harness = harness(TestPage::new(state));
    harness.run();

    harness.get_by_label("Start Interview").click();
    harness.run();
    assert!(run_until(&mut harness, |page| page.state.session_state.is_active()));

    harness.get_by_label("Code editor").focus();
    harness.run();
    harness.get_by_label("Code editor").type_text("int seen = 0;");
    harness.run();

    assert!(harness.state().editor.content().contains("int seen = 0;"));
    assert!(run_until(&mut harness, |page| page.state.last_broadcast.is_some()));

    let sent = service.sent.lock().clone();
    let updates: Vec<_> = sent
        .iter()
        .filter(|m| m.kind() == MessageKind::CodeUpdate)
        .collect();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].code().unwrap_or_default().contains("int seen = 0;"));
}

/// Interviewer transcript lines are listed on the page
#[test]
fn test_transcript_lines_are_accessible() {
    let (_runtime, state, service) = live_relay(fast_config());
    let mut harness = harness(TestPage::new(state));
    harness.run();

    harness.get_by_label("Start Interview").click();
    harness.run();
    assert!(run_until(&mut harness, |page| page.state.session_state.is_active()));

    service.emit(ServiceEvent::Message(serde_json::json!({
        "type": "transcript",
        "role": "assistant",
        "transcriptType": "final",
        "transcript": "Can you do better than quadratic time?"
    })));
    assert!(run_until(&mut harness, |page| !page.state.transcript.is_empty()));

    let _ = harness.get_by_label("Interviewer: Can you do better than quadratic time?");
}
