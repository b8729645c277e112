//! Main application struct and eframe integration
//!
//! This module contains the InterviewApp that implements eframe::App.

use crate::editor::{CodeEditor, EditorOptions};
use crate::problem::Problem;
use crate::relay::RelayHandle;
use crate::ui::components::InterviewPage;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel};
use std::time::Duration;
use tracing::info;

/// Point size of the code font, a notch above body text
const EDITOR_FONT_SIZE: f32 = 15.0;

/// Main interview application
pub struct InterviewApp {
    /// Application state
    state: AppState,
    /// Problem being practised
    problem: Problem,
    /// Code editor widget, released on exit
    editor: CodeEditor,
    /// Visual theme
    theme: Theme,
}

impl InterviewApp {
    /// Create the app and wire the editor to the relay
    pub fn new(cc: &eframe::CreationContext<'_>, relay: RelayHandle, problem: Problem) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);
        Self::with_theme(relay, problem, theme)
    }

    fn with_theme(relay: RelayHandle, problem: Problem, theme: Theme) -> Self {
        let state = AppState::with_relay(relay);
        let mut editor = CodeEditor::new(problem.starter_code, editor_options(&problem));
        state.connect_editor(&mut editor);

        info!("Interview UI initialized");

        Self {
            state,
            problem,
            editor,
            theme,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

impl eframe::App for InterviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_events();

        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                InterviewPage::new(&mut self.state, &mut self.editor, &self.problem, &self.theme)
                    .show(ui);
            });

        // Relay events arrive off the UI thread
        ctx.request_repaint_after(Duration::from_millis(250));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Interview UI shutting down");
        self.state.shutdown();
        self.editor.dispose();
    }
}

fn editor_options(problem: &Problem) -> EditorOptions {
    EditorOptions::default()
        .with_language(problem.language)
        .with_font_size(EDITOR_FONT_SIZE)
        .with_dark_theme(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::TWO_SUM;

    #[test]
    fn test_editor_options_follow_problem() {
        let options = editor_options(&TWO_SUM);
        assert_eq!(options.language, TWO_SUM.language);
        assert_eq!(options.font_size, EDITOR_FONT_SIZE);
        assert!(options.dark_theme);
    }
}
