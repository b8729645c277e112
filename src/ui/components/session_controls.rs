//! Start / End / Share buttons

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText, Vec2};

pub struct SessionControls<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> SessionControls<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let half = (width - self.theme.spacing) / 2.0;

        ui.horizontal(|ui| {
            let start = self.button("Start Interview", self.theme.primary, Color32::BLACK, half);
            if ui.add_enabled(self.state.can_start(), start).clicked() {
                self.state.start_interview();
            }

            ui.add_space(self.theme.spacing - self.theme.spacing_sm);

            let end = self.button("End Interview", self.theme.error, Color32::WHITE, half);
            if ui.add_enabled(self.state.can_end(), end).clicked() {
                self.state.end_interview();
            }
        });

        let share = self.button("Share Current Code", self.theme.secondary, Color32::WHITE, width);
        if ui.add_enabled(self.state.can_share(), share).clicked() {
            self.state.share_code();
        }
    }

    fn button(&self, text: &str, fill: Color32, text_color: Color32, width: f32) -> egui::Button<'static> {
        egui::Button::new(RichText::new(text.to_string()).strong().color(text_color))
            .fill(fill)
            .rounding(self.theme.button_rounding)
            .min_size(Vec2::new(width, 36.0))
    }
}
