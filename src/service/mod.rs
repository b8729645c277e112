//! Remote voice-assistant service contract
//!
//! The relay only talks to the service through [`VoiceService`]. Events flow
//! back through an unbounded channel handed over with `subscribe`.

pub mod message;
pub mod vapi;

use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

pub use message::{MessageKind, OutgoingMessage, WireFrame};
pub use vapi::{VapiConfig, VapiService};

/// Events emitted by the remote service
///
/// Lifecycle events carry the id the call was started with, so a late event
/// from an earlier call can be told apart from the current one.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// The call is connected
    CallStart(Uuid),
    /// The call has ended, from either side
    CallEnd(Uuid),
    /// The service reported an error
    Error(String),
    /// Any other message from the assistant
    Message(serde_json::Value),
}

pub type ServiceEventSender = UnboundedSender<ServiceEvent>;

/// Metadata attached to a call when it starts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetadata {
    pub question: String,
    pub session_type: String,
    pub language: String,
}

/// Per-call assistant overrides
#[derive(Debug, Clone, Serialize)]
pub struct CallOptions {
    pub metadata: CallMetadata,
}

impl CallOptions {
    /// Options for a technical interview on `question`
    pub fn technical_interview(question: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            metadata: CallMetadata {
                question: question.into(),
                session_type: "technical-interview".to_string(),
                language: language.into(),
            },
        }
    }
}

/// Connection API of a conversational voice service
///
/// The relay shares the service between its own task and the task that runs
/// `start`, so `stop` and `send` may be called while a start is in flight.
#[async_trait]
pub trait VoiceService: Send + Sync {
    /// Register the channel that receives call events
    fn subscribe(&mut self, events: ServiceEventSender);

    /// Start call `call` with the given assistant. Resolves once the request
    /// is accepted; `CallStart(call)` arrives as an event. The future may be
    /// dropped before it resolves when the user gives up on the call.
    async fn start(&self, call: Uuid, assistant_id: &str, options: &CallOptions) -> Result<()>;

    /// Stop the current call, if any
    async fn stop(&self);

    /// Fire-and-forget delivery of a message into the live call
    fn send(&self, message: &OutgoingMessage);
}
