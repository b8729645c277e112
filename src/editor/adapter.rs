//! Editor widget adapter
//!
//! `CodeEditor` owns the text buffer rendered by an egui `TextEdit` in
//! code-editor mode. Listeners registered with `on_content_changed` receive
//! the full buffer after every edit; `on_cursor_moved` listeners receive the
//! caret position whenever it changes, whether or not the text changed.

use egui::{self, Color32, FontId, RichText, TextEdit};
use tracing::debug;

/// Caret position inside the buffer (zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    /// Character offset from the start of the buffer
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    /// Resolve a character offset into line and column
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut line = 0;
        let mut column = 0;
        for ch in text.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        Self {
            offset: offset.min(text.chars().count()),
            line,
            column,
        }
    }
}

impl std::fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ln {}, Col {}", self.line + 1, self.column + 1)
    }
}

/// Creation options for the editor widget
#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Language tag shown in the editor footer
    pub language: String,
    /// Font size in points
    pub font_size: f32,
    /// Dark editing surface (vs-dark) instead of the light one
    pub dark_theme: bool,
    /// Soft-wrap long lines
    pub wrap_lines: bool,
    /// Minimum number of visible rows
    pub desired_rows: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            language: "cpp".to_string(),
            font_size: 14.0,
            dark_theme: true,
            wrap_lines: false,
            desired_rows: 30,
        }
    }
}

impl EditorOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_dark_theme(mut self, dark_theme: bool) -> Self {
        self.dark_theme = dark_theme;
        self
    }

    /// Background and text color of the editing surface
    pub fn palette(&self) -> (Color32, Color32) {
        if self.dark_theme {
            (Color32::from_rgb(0x1e, 0x1e, 0x1e), Color32::from_rgb(0xd4, 0xd4, 0xd4))
        } else {
            (Color32::from_rgb(0xff, 0xff, 0xfe), Color32::from_rgb(0x1f, 0x1f, 0x1f))
        }
    }
}

/// Handle returned by listener registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ContentListener = Box<dyn FnMut(&str)>;
type CursorListener = Box<dyn FnMut(CursorPosition)>;

/// Code editing surface with change notifications
pub struct CodeEditor {
    id: egui::Id,
    options: EditorOptions,
    /// `None` once disposed
    buffer: Option<String>,
    cursor: Option<CursorPosition>,
    content_listeners: Vec<(ListenerId, ContentListener)>,
    cursor_listeners: Vec<(ListenerId, CursorListener)>,
    next_listener: u64,
}

impl CodeEditor {
    /// Create an editor holding `initial` text
    pub fn new(initial: impl Into<String>, options: EditorOptions) -> Self {
        Self {
            id: egui::Id::new("code_editor"),
            options,
            buffer: Some(initial.into()),
            cursor: None,
            content_listeners: Vec::new(),
            cursor_listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Current text; empty after disposal
    pub fn content(&self) -> &str {
        self.buffer.as_deref().unwrap_or("")
    }

    pub fn cursor(&self) -> Option<CursorPosition> {
        self.cursor
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_disposed(&self) -> bool {
        self.buffer.is_none()
    }

    /// Register a listener called with the full content after every edit
    pub fn on_content_changed(&mut self, listener: impl FnMut(&str) + 'static) -> ListenerId {
        let id = self.allocate_id();
        if !self.is_disposed() {
            self.content_listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// Register a listener called whenever the caret moves
    pub fn on_cursor_moved(
        &mut self,
        listener: impl FnMut(CursorPosition) + 'static,
    ) -> ListenerId {
        let id = self.allocate_id();
        if !self.is_disposed() {
            self.cursor_listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// Remove a previously registered listener. Returns false if unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listener_count();
        self.content_listeners.retain(|(lid, _)| *lid != id);
        self.cursor_listeners.retain(|(lid, _)| *lid != id);
        self.listener_count() != before
    }

    pub fn listener_count(&self) -> usize {
        self.content_listeners.len() + self.cursor_listeners.len()
    }

    /// Replace the buffer programmatically, notifying like a user edit
    pub fn set_content(&mut self, content: impl Into<String>) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        let content = content.into();
        if *buffer == content {
            return;
        }
        *buffer = content;
        notify_content(&mut self.content_listeners, buffer);
    }

    /// Move the caret programmatically
    pub fn set_cursor(&mut self, offset: usize) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        let position = CursorPosition::from_offset(buffer, offset);
        self.move_cursor(position);
    }

    /// Render the widget and dispatch notifications for this frame's edits
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(buffer) = self.buffer.as_mut() else {
            ui.label(RichText::new("Editor closed").italics());
            return;
        };

        let (background, text_color) = self.options.palette();
        let mut edit = TextEdit::multiline(buffer)
            .id(self.id)
            .code_editor()
            .background_color(background)
            .text_color(text_color)
            .font(FontId::monospace(self.options.font_size))
            .desired_rows(self.options.desired_rows)
            .lock_focus(true);
        if self.options.wrap_lines {
            edit = edit.desired_width(ui.available_width());
        } else {
            edit = edit.desired_width(f32::INFINITY);
        }

        let output = edit.show(ui);
        output.response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Code editor")
        });

        if output.response.changed() {
            debug!("Editor changed, code length: {}", buffer.len());
            notify_content(&mut self.content_listeners, buffer);
        }

        let position = output
            .cursor_range
            .map(|range| CursorPosition::from_offset(buffer, range.primary.ccursor.index));
        if let Some(position) = position {
            self.move_cursor(position);
        }
    }

    /// Release the buffer and every listener. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.buffer.take().is_none() {
            return;
        }
        let released = self.listener_count();
        self.content_listeners.clear();
        self.cursor_listeners.clear();
        self.cursor = None;
        debug!("Editor disposed, released {} listeners", released);
    }

    fn move_cursor(&mut self, position: CursorPosition) {
        if self.cursor == Some(position) {
            return;
        }
        self.cursor = Some(position);
        for (_, listener) in self.cursor_listeners.iter_mut() {
            listener(position);
        }
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }
}

impl Drop for CodeEditor {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn notify_content(listeners: &mut [(ListenerId, ContentListener)], content: &str) {
    for (_, listener) in listeners.iter_mut() {
        listener(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_cursor_position_from_offset() {
        let text = "ab\ncd\n";
        assert_eq!(
            CursorPosition::from_offset(text, 4),
            CursorPosition { offset: 4, line: 1, column: 1 }
        );
        assert_eq!(CursorPosition::from_offset(text, 0).line, 0);
        // Clamped to the buffer length
        assert_eq!(CursorPosition::from_offset(text, 99).offset, 6);
        assert_eq!(CursorPosition::from_offset(text, 4).to_string(), "Ln 2, Col 2");
    }

    #[test]
    fn test_content_listener_receives_full_text() {
        let mut editor = CodeEditor::new("int a;", EditorOptions::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.on_content_changed(move |code| sink.borrow_mut().push(code.to_string()));

        editor.set_content("int a;\nint b;");
        editor.set_content("int a;\nint b;");

        assert_eq!(*seen.borrow(), vec!["int a;\nint b;".to_string()]);
        assert_eq!(editor.content(), "int a;\nint b;");
    }

    #[test]
    fn test_cursor_listener_independent_of_edits() {
        let mut editor = CodeEditor::new("one\ntwo", EditorOptions::default());
        let edits = Rc::new(RefCell::new(0));
        let moves = Rc::new(RefCell::new(Vec::new()));
        let edit_sink = Rc::clone(&edits);
        let move_sink = Rc::clone(&moves);
        editor.on_content_changed(move |_| *edit_sink.borrow_mut() += 1);
        editor.on_cursor_moved(move |pos| move_sink.borrow_mut().push(pos));

        editor.set_cursor(5);
        editor.set_cursor(5);
        editor.set_cursor(1);

        assert_eq!(*edits.borrow(), 0);
        assert_eq!(moves.borrow().len(), 2);
        assert_eq!(moves.borrow()[0].line, 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut editor = CodeEditor::new("", EditorOptions::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = editor.on_content_changed(move |_| *sink.borrow_mut() += 1);

        editor.set_content("x");
        assert!(editor.unsubscribe(id));
        assert!(!editor.unsubscribe(id));
        editor.set_content("xy");

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_dispose_releases_listeners_once() {
        let mut editor = CodeEditor::new("code", EditorOptions::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        editor.on_content_changed(move |_| *sink.borrow_mut() += 1);
        editor.on_cursor_moved(|_| {});
        assert_eq!(editor.listener_count(), 2);

        editor.dispose();
        editor.dispose();

        assert!(editor.is_disposed());
        assert_eq!(editor.listener_count(), 0);
        assert_eq!(editor.content(), "");
        // Captured state is dropped with the listener
        assert_eq!(Rc::strong_count(&count), 1);

        editor.set_content("ignored");
        editor.on_content_changed(|_| panic!("disposed editor must not notify"));
        editor.set_content("still ignored");
        assert_eq!(editor.listener_count(), 0);
    }

    /// Fill colors of the rectangles painted for one frame of `editor`
    fn painted_fills(editor: &mut CodeEditor) -> Vec<Color32> {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| editor.show(ui));
        });
        output
            .shapes
            .iter()
            .filter_map(|clipped| match &clipped.shape {
                egui::Shape::Rect(rect) => Some(rect.fill),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_theme_option_sets_editor_surface() {
        let dark = EditorOptions::default();
        let light = EditorOptions::default().with_dark_theme(false);
        let (dark_bg, dark_text) = dark.palette();
        let (light_bg, light_text) = light.palette();
        assert_ne!(dark_bg, light_bg);
        assert_ne!(dark_text, light_text);

        let mut editor = CodeEditor::new("int main() {}", dark);
        let fills = painted_fills(&mut editor);
        assert!(fills.contains(&dark_bg));
        assert!(!fills.contains(&light_bg));

        let mut editor = CodeEditor::new("int main() {}", light);
        let fills = painted_fills(&mut editor);
        assert!(fills.contains(&light_bg));
        assert!(!fills.contains(&dark_bg));
    }
}
