//! Status panel component
//!
//! Connection indicator, last code update time, and any configuration or
//! service error.

use crate::relay::SessionState;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use chrono::{DateTime, Local, Utc};
use egui::{self, Color32, RichText, Vec2};

pub struct StatusPanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_tertiary)
            .stroke(egui::Stroke::new(1.0, self.theme.border))
            .rounding(self.theme.button_rounding)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                ui.horizontal(|ui| {
                    self.draw_dot(ui);
                    ui.label(
                        RichText::new(format!("Interview Status: {}", self.state.session_state))
                            .color(self.theme.text_primary),
                    );
                });

                ui.label(
                    RichText::new(format!(
                        "Last code update: {}",
                        local_time(self.state.last_code_update())
                    ))
                    .small()
                    .color(self.theme.text_muted),
                );

                if let Some(sent) = self.state.last_broadcast {
                    ui.label(
                        RichText::new(format!("Last shared with interviewer: {}", local_time(sent)))
                            .small()
                            .color(self.theme.text_muted),
                    );
                }

                if let Some(error) = &self.state.config_error {
                    ui.label(
                        RichText::new(format!("Voice assistant unavailable: {}", error))
                            .small()
                            .color(self.theme.error),
                    );
                } else if let Some(error) = &self.state.last_error {
                    ui.label(RichText::new(error).small().color(self.theme.error));
                }
            });
    }

    fn indicator_color(&self) -> Color32 {
        match self.state.session_state {
            SessionState::Idle => self.theme.idle,
            SessionState::Connecting => self.theme.warning,
            SessionState::Active => self.theme.success,
        }
    }

    fn draw_dot(&self, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(12.0), egui::Sense::hover());
        ui.painter()
            .circle_filled(rect.center(), 6.0, self.indicator_color());
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
