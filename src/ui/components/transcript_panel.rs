//! Interviewer transcript and relay activity

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

pub struct TranscriptPanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> TranscriptPanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Interviewer").strong().color(self.theme.text_primary));

        ScrollArea::vertical()
            .id_salt("transcript")
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if self.state.transcript.is_empty() {
                    ui.label(
                        RichText::new("The interviewer's replies will appear here.")
                            .italics()
                            .color(self.theme.text_muted),
                    );
                }
                for line in self.state.transcript.iter() {
                    let response = ui.label(RichText::new(line).color(self.theme.text_secondary));
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Interviewer: {}", line),
                        )
                    });
                }

                ui.add_space(self.theme.spacing_sm);
                for line in self.state.activity.iter() {
                    ui.label(
                        RichText::new(line)
                            .small()
                            .family(egui::FontFamily::Monospace)
                            .color(self.theme.text_muted),
                    );
                }
            });
    }
}
