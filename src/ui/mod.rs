//! UI components and application module
//!
//! This module provides the egui/eframe-based interview page.

mod app;
pub mod components;
mod state;
mod theme;

pub use app::InterviewApp;
pub use components::{InterviewPage, ProblemPanel, SessionControls, StatusPanel, TranscriptPanel};
pub use state::{AppState, RecentLines};
pub use theme::Theme;
