//! Two-column interview page
//!
//! Left: problem, status, controls and transcript. Right: the code editor.

use crate::editor::CodeEditor;
use crate::problem::Problem;
use crate::ui::components::{ProblemPanel, SessionControls, StatusPanel, TranscriptPanel};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub struct InterviewPage<'a> {
    state: &'a mut AppState,
    editor: &'a mut CodeEditor,
    problem: &'a Problem,
    theme: &'a Theme,
}

impl<'a> InterviewPage<'a> {
    pub fn new(
        state: &'a mut AppState,
        editor: &'a mut CodeEditor,
        problem: &'a Problem,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            editor,
            problem,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Self {
            state,
            editor,
            problem,
            theme,
        } = self;

        ui.columns(2, |columns| {
            theme.card().show(&mut columns[0], |ui| {
                ui.set_width(ui.available_width());
                ProblemPanel::new(problem, theme).show(ui);
                ui.add_space(theme.spacing);
                StatusPanel::new(state, theme).show(ui);
                ui.add_space(theme.spacing_lg);
                SessionControls::new(state, theme).show(ui);
                ui.add_space(theme.spacing);
                TranscriptPanel::new(state, theme).show(ui);
            });

            theme.card().inner_margin(0.0).show(&mut columns[1], |ui| {
                ui.set_width(ui.available_width());
                egui::Frame::none().inner_margin(theme.spacing).show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("Code Editor ({})", problem.language_label()))
                            .size(17.0)
                            .strong()
                            .color(theme.text_primary),
                    );
                });
                ui.separator();
                egui::ScrollArea::both()
                    .id_salt("editor_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        editor.show(ui);
                    });
                if let Some(cursor) = editor.cursor() {
                    ui.label(
                        RichText::new(format!("{}  {}", cursor, editor.options().language))
                            .small()
                            .color(theme.text_muted),
                    );
                }
            });
        });
    }
}
