//! Problem statement card

use crate::problem::Problem;
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

pub struct ProblemPanel<'a> {
    problem: &'a Problem,
    theme: &'a Theme,
}

impl<'a> ProblemPanel<'a> {
    pub fn new(problem: &'a Problem, theme: &'a Theme) -> Self {
        Self { problem, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Problem Statement")
                .heading()
                .strong()
                .color(self.theme.text_primary),
        );
        ui.add_space(self.theme.spacing_sm);

        ScrollArea::vertical()
            .id_salt("problem_statement")
            .max_height(ui.available_height() * 0.5)
            .show(ui, |ui| {
                let response = ui.label(
                    RichText::new(self.problem.statement.trim())
                        .monospace()
                        .color(self.theme.text_secondary),
                );
                response.widget_info(|| {
                    egui::WidgetInfo::labeled(
                        egui::WidgetType::Label,
                        true,
                        format!("Problem statement: {}", self.problem.title),
                    )
                });
            });
    }
}
