//! Top bar UI: app title, dataset selection, actions and status.

use super::colors;
use crate::data::DATASETS;
use crate::map::SlippyMap;
use crate::state::AppState;
use crate::sync::ViewSync;
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

/// Actions the top bar cannot complete on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    /// Open the share dialog with a fresh link
    Share,
    /// Start a geolocation lookup
    Locate,
}

pub fn render_top_bar(
    ctx: &egui::Context,
    state: &mut AppState,
    sync: &mut ViewSync<SlippyMap>,
) -> Option<TopBarAction> {
    let mut action = None;

    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Dataset Viewer")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.label(RichText::new("Dataset:").size(12.0).color(colors::ui::LABEL));
                render_dataset_selector(ui, state, sync);

                ui.separator();

                if ui
                    .button(format!("{} Share", icons::SHARE_NETWORK))
                    .on_hover_text("Copy a link to this view")
                    .clicked()
                {
                    action = Some(TopBarAction::Share);
                }

                if ui
                    .button(icons::CROSSHAIR)
                    .on_hover_text("Center on my location")
                    .clicked()
                {
                    action = Some(TopBarAction::Locate);
                }

                let dataset = sync.active_dataset();
                if ui
                    .button(format!("{} Download", icons::DOWNLOAD_SIMPLE))
                    .on_hover_text(format!("Download {}", dataset.file))
                    .clicked()
                {
                    let url = dataset.download_url(&state.settings.data_host);
                    log::info!("Opening download {}", url);
                    ctx.open_url(egui::OpenUrl::new_tab(url));
                }

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });

    action
}

fn render_dataset_selector(ui: &mut egui::Ui, state: &mut AppState, sync: &mut ViewSync<SlippyMap>) {
    let current = sync.active_dataset().name;
    let mut selected = current;

    egui::ComboBox::from_id_salt("dataset_selector")
        .selected_text(RichText::new(current).color(colors::ui::ACTIVE))
        .width(120.0)
        .show_ui(ui, |ui| {
            for dataset in DATASETS {
                ui.selectable_value(&mut selected, dataset.name, dataset.name);
            }
        });

    if selected != current {
        state.status_message = match sync.select_dataset(selected) {
            Ok(()) => format!("Showing {}", selected),
            Err(e) => {
                log::error!("Dataset selection failed: {}", e);
                format!("Could not show {}", selected)
            }
        };
    }
}
