//! Share dialog and the "link copied" toast.

use super::colors;
use crate::state::AppState;
use eframe::egui::{self, RichText};
use egui_phosphor::regular as icons;
use web_time::Instant;

/// Modal showing the shareable link while `state.share_link` is set.
///
/// Copying closes the dialog and starts the toast. Clicking the backdrop,
/// pressing Escape or the close button dismisses without copying.
pub fn render_share_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(link) = state.share_link.clone() else {
        return;
    };

    let mut copied = false;
    let mut close = false;

    let response = egui::Modal::new(egui::Id::new("share_dialog")).show(ctx, |ui| {
        ui.set_width(420.0);
        ui.horizontal(|ui| {
            ui.heading("Share this view");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(icons::X).on_hover_text("Close").clicked() {
                    close = true;
                }
            });
        });

        ui.add_space(6.0);

        let mut text = link.as_str();
        ui.add(
            egui::TextEdit::singleline(&mut text)
                .desired_width(f32::INFINITY)
                .font(egui::FontId::monospace(12.0)),
        );

        ui.add_space(6.0);

        if ui.button(format!("{} Copy link", icons::COPY)).clicked() {
            copied = true;
        }
    });

    if copied {
        ctx.copy_text(link);
        state.show_toast(Instant::now());
        state.close_share_dialog();
    } else if close || response.should_close() {
        state.close_share_dialog();
    }
}

/// Short confirmation shown after copying the link.
pub fn render_toast(ctx: &egui::Context, state: &mut AppState) {
    let now = Instant::now();
    if !state.toast_visible(now) {
        return;
    }

    egui::Area::new(egui::Id::new("copy_toast"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -32.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(
                    RichText::new(format!("{} Link copied to clipboard", icons::CHECK))
                        .color(colors::ui::SUCCESS),
                );
            });
        });

    // Wake up again to hide it
    if let Some(until) = state.toast_until {
        ctx.request_repaint_after(until.saturating_duration_since(now));
    }
}
