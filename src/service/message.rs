//! Messages sent into a live call
//!
//! An [`OutgoingMessage`] is what the relay decides to say. It expands into
//! one or more [`WireFrame`]s, the JSON objects the voice service accepts.

use crate::problem::Problem;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Marker the assistant is prompted to react to by revealing the solution
pub const END_SESSION_MARKER: &str = "END_SESSION — SHOW_SOLUTION";

/// Kind of an outgoing message, for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    InitialContext,
    CodeUpdate,
    ManualShare,
    CursorActivity,
    EndOfSession,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::InitialContext => write!(f, "initial-context"),
            MessageKind::CodeUpdate => write!(f, "code-update"),
            MessageKind::ManualShare => write!(f, "manual-share"),
            MessageKind::CursorActivity => write!(f, "cursor-activity"),
            MessageKind::EndOfSession => write!(f, "end-of-session"),
        }
    }
}

/// A message the relay sends to the interviewer
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    /// Sent once after the call settles
    InitialContext { problem: Problem, code: String },
    /// Debounced broadcast of the latest code
    CodeUpdate {
        problem: Problem,
        code: String,
        timestamp: DateTime<Utc>,
    },
    /// User-requested review of the current code
    ManualShare { problem: Problem, code: String },
    /// Caret moved
    CursorActivity { timestamp: DateTime<Utc> },
    /// Ask the assistant to wrap up and show the solution
    EndOfSession,
}

impl OutgoingMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            OutgoingMessage::InitialContext { .. } => MessageKind::InitialContext,
            OutgoingMessage::CodeUpdate { .. } => MessageKind::CodeUpdate,
            OutgoingMessage::ManualShare { .. } => MessageKind::ManualShare,
            OutgoingMessage::CursorActivity { .. } => MessageKind::CursorActivity,
            OutgoingMessage::EndOfSession => MessageKind::EndOfSession,
        }
    }

    /// Code carried by this message, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            OutgoingMessage::InitialContext { code, .. }
            | OutgoingMessage::CodeUpdate { code, .. }
            | OutgoingMessage::ManualShare { code, .. } => Some(code),
            OutgoingMessage::CursorActivity { .. } | OutgoingMessage::EndOfSession => None,
        }
    }

    /// Expand into the frames written to the service
    pub fn frames(&self) -> Vec<WireFrame> {
        match self {
            OutgoingMessage::InitialContext { problem, code } => vec![
                WireFrame::user_message(format!(
                    "Hi! I'm starting a technical interview for the {} problem. Here's my initial code:\n\n{}\n\nI'm ready to begin the interview.",
                    problem.title,
                    fenced(problem, code)
                )),
                WireFrame::ContextUpdate {
                    payload: ContextPayload {
                        question: problem.statement.to_string(),
                        code: code.clone(),
                        language: problem.language.to_string(),
                        timestamp: None,
                        session_start: Some(true),
                    },
                },
            ],
            OutgoingMessage::CodeUpdate {
                problem,
                code,
                timestamp,
            } => vec![
                WireFrame::user_message(format!(
                    "[CODE UPDATE] Current code in Monaco editor:\n{}\n\nPlease review my current progress on the {} problem.",
                    fenced(problem, code),
                    problem.title
                )),
                WireFrame::ContextUpdate {
                    payload: ContextPayload {
                        question: problem.statement.to_string(),
                        code: code.clone(),
                        language: problem.language.to_string(),
                        timestamp: Some(timestamp.timestamp_millis()),
                        session_start: None,
                    },
                },
            ],
            OutgoingMessage::ManualShare { problem, code } => vec![WireFrame::user_message(format!(
                "Please review my current code:\n\n{}\n\nWhat do you think about my approach?",
                fenced(problem, code)
            ))],
            OutgoingMessage::CursorActivity { timestamp } => vec![WireFrame::UserActivity {
                payload: ActivityPayload {
                    kind: "cursor-move".to_string(),
                    timestamp: timestamp.timestamp_millis(),
                },
            }],
            OutgoingMessage::EndOfSession => vec![WireFrame::user_message(END_SESSION_MARKER)],
        }
    }
}

fn fenced(problem: &Problem, code: &str) -> String {
    format!("```{}\n{}\n```", problem.language, code)
}

/// Chat message injected into the conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Structured problem/code context
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPayload {
    pub question: String,
    pub code: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_start: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: i64,
}

/// A single JSON control frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WireFrame {
    AddMessage { message: ChatMessage },
    ContextUpdate { payload: ContextPayload },
    UserActivity { payload: ActivityPayload },
    EndCall,
}

impl WireFrame {
    pub fn user_message(content: impl Into<String>) -> Self {
        WireFrame::AddMessage {
            message: ChatMessage {
                role: "user".to_string(),
                content: content.into(),
            },
        }
    }
}
