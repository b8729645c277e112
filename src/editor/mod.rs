//! Code editor adapter
//!
//! Wraps an egui text widget in code-editor mode and exposes the current
//! content plus change and cursor notifications.

pub mod adapter;
pub mod snapshot;

pub use adapter::{CodeEditor, CursorPosition, EditorOptions, ListenerId};
pub use snapshot::CodeSnapshot;
