//! Central canvas UI: the map and a camera readout.

use super::colors;
use crate::map::SlippyMap;
use crate::sync::{ViewSync, DATASET_SOURCE_ID};
use eframe::egui::{self, FontId, Rect, Vec2};

pub fn render_canvas(ctx: &egui::Context, sync: &mut ViewSync<SlippyMap>) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let response = sync.show(ui);
            render_readout(ui.painter(), response.rect, sync);
        });
}

/// Lat/lng/zoom and dataset in the top-left corner, plus a hint while the
/// camera is zoomed out past the dataset tiles.
fn render_readout(painter: &egui::Painter, rect: Rect, sync: &ViewSync<SlippyMap>) {
    let view = sync.view();
    let dataset = sync.active_dataset().name;

    let mut lines = vec![format!(
        "Lat {:.4}  Lng {:.4}  Zoom {:.2}  |  {}",
        view.latitude, view.longitude, view.zoom, dataset
    )];
    if let Some(source) = sync
        .map()
        .source(DATASET_SOURCE_ID)
        .filter(|s| !s.visible_at(view.zoom))
    {
        lines.push(format!("Zoom in to {} to see {}", source.min_zoom, dataset));
    }

    let pos = rect.min + Vec2::new(8.0, 8.0);
    let galley = painter.layout_no_wrap(
        lines.join("\n"),
        FontId::monospace(12.0),
        colors::overlay::READOUT_TEXT,
    );
    let bg = Rect::from_min_size(pos, galley.size()).expand(4.0);

    painter.rect_filled(bg, 4.0, colors::overlay::READOUT_BG);
    painter.galley(pos, galley, colors::overlay::READOUT_TEXT);
}
