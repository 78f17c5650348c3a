//! Slippy map widget: camera, source/layer registry and event queue.
//!
//! Panning, zooming and tile fetching are done by [`walkers`]. This type
//! keeps the registry the synchronizer works against and turns changes of
//! the walkers camera into [`MapEvent::Move`].

use super::source::{RasterLayer, RasterSource};
use super::{Camera, LayerError, MapEvent, MapWidget, MAX_ZOOM};
use eframe::egui::{self, Color32, Vec2};
use std::collections::{BTreeMap, VecDeque};
use walkers::{lat_lon, HttpTiles, Map, MapMemory, Position, Tiles};

/// Background shown behind tiles that have not loaded yet.
const BACKGROUND: Color32 = Color32::from_rgb(226, 226, 222);

/// A source plus its tile cache, which is created on first draw.
struct RegisteredSource {
    source: RasterSource,
    tiles: Option<HttpTiles>,
}

impl RegisteredSource {
    fn new(source: RasterSource) -> Self {
        Self {
            source,
            tiles: None,
        }
    }

    fn tiles(&mut self, ctx: &egui::Context) -> &mut HttpTiles {
        let source = &self.source;
        self.tiles
            .get_or_insert_with(|| HttpTiles::new(source.clone(), ctx.clone()))
    }
}

/// An egui map that draws a basemap plus raster layers.
pub struct SlippyMap {
    camera: Camera,
    memory: MapMemory,
    basemap: RegisteredSource,
    attribution: String,
    sources: BTreeMap<String, RegisteredSource>,
    /// Draw order, bottom first
    layers: Vec<RasterLayer>,
    events: VecDeque<MapEvent>,
    loaded: bool,
}

impl SlippyMap {
    pub fn new(camera: Camera, basemap: RasterSource, attribution: impl Into<String>) -> Self {
        Self {
            camera,
            memory: memory_at(camera),
            basemap: RegisteredSource::new(basemap),
            attribution: attribution.into(),
            sources: BTreeMap::new(),
            layers: Vec::new(),
            events: VecDeque::new(),
            loaded: false,
        }
    }

    pub fn source(&self, id: &str) -> Option<&RasterSource> {
        self.sources.get(id).map(|entry| &entry.source)
    }

    #[cfg(test)]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    #[cfg(test)]
    pub fn layers(&self) -> &[RasterLayer] {
        &self.layers
    }

    /// Whether the initial load has happened.
    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn mark_loaded(&mut self) {
        if !self.loaded {
            self.loaded = true;
            self.events.push_back(MapEvent::Load);
        }
    }

    /// Records a new camera. Returns whether it changed.
    fn move_camera(&mut self, camera: Camera) -> bool {
        if camera == self.camera {
            return false;
        }
        self.camera = camera;
        self.events.push_back(MapEvent::Move);
        true
    }

    /// Renders the map into all available space and applies user interaction.
    ///
    /// The first call queues [`MapEvent::Load`]; camera changes queue
    /// [`MapEvent::Move`].
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let ctx = ui.ctx().clone();
        ui.painter()
            .rect_filled(ui.available_rect_before_wrap(), 0.0, BACKGROUND);

        let before = (self.memory.detached(), self.memory.zoom());
        let zoom = before.1;

        let layers = &self.layers;
        let mut overlays: Vec<(usize, &mut HttpTiles)> = self
            .sources
            .iter_mut()
            .filter(|(_, entry)| entry.source.visible_at(zoom))
            .filter_map(|(id, entry)| {
                let order = layers.iter().position(|l| &l.source == id)?;
                Some((order, entry.tiles(&ctx)))
            })
            .collect();
        overlays.sort_by_key(|(order, _)| *order);

        let basemap: &mut dyn Tiles = self.basemap.tiles(&ctx);
        let mut map = Map::new(Some(basemap), &mut self.memory, position(self.camera))
            .zoom_with_ctrl(false)
            .double_click_to_zoom(true);
        for (_, tiles) in overlays {
            map = map.with_layer(tiles, 1.0);
        }
        let response = ui.add(map);

        if self.memory.zoom() > MAX_ZOOM {
            set_zoom(&mut self.memory, MAX_ZOOM);
        }
        let after = (self.memory.detached(), self.memory.zoom());
        if after != before {
            let center = after.0.unwrap_or_else(|| position(self.camera));
            self.move_camera(Camera::new(center.y(), center.x(), after.1));
        }

        draw_attribution(ui.painter(), response.rect, &self.attribution);

        self.mark_loaded();
        response
    }
}

fn position(camera: Camera) -> Position {
    lat_lon(camera.lat, camera.lon)
}

fn set_zoom(memory: &mut MapMemory, zoom: f64) {
    if let Err(e) = memory.set_zoom(zoom) {
        log::warn!("Map rejected zoom {}: {}", zoom, e);
    }
}

/// Walkers state pinned to `camera`.
fn memory_at(camera: Camera) -> MapMemory {
    let mut memory = MapMemory::default();
    memory.center_at(position(camera));
    set_zoom(&mut memory, camera.zoom);
    memory
}

fn draw_attribution(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    if text.is_empty() {
        return;
    }
    painter.text(
        rect.max - Vec2::new(5.0, 5.0),
        egui::Align2::RIGHT_BOTTOM,
        text,
        egui::FontId::proportional(10.0),
        Color32::from_black_alpha(160),
    );
}

impl MapWidget for SlippyMap {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn jump_to(&mut self, camera: Camera) {
        if self.move_camera(camera) {
            self.memory = memory_at(camera);
        }
    }

    fn add_source(&mut self, id: &str, source: RasterSource) -> Result<(), LayerError> {
        if self.sources.contains_key(id) {
            return Err(LayerError::DuplicateSource(id.to_string()));
        }
        self.sources
            .insert(id.to_string(), RegisteredSource::new(source));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), LayerError> {
        if !self.sources.contains_key(id) {
            return Err(LayerError::UnknownSource(id.to_string()));
        }
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(LayerError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources.remove(id);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(&mut self, layer: RasterLayer) -> Result<(), LayerError> {
        if self.has_layer(&layer.id) {
            return Err(LayerError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(LayerError::UnknownSource(layer.source));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), LayerError> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))?;
        self.layers.remove(index);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Rect};

    fn test_map() -> SlippyMap {
        SlippyMap::new(
            Camera::new(50.0, -114.0, 12.0),
            RasterSource::new("", "https://tiles.test/{z}/{x}/{y}.png"),
            "",
        )
    }

    fn source() -> RasterSource {
        RasterSource::new("http://localhost", "/tiles/A/{z}/{x}/{y}.png")
    }

    /// Runs one headless egui frame with no user input.
    fn render_frame(map: &mut SlippyMap) {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(pos2(0.0, 0.0), vec2(320.0, 240.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                map.show(ui);
            });
        });
    }

    #[test]
    fn test_layer_requires_source() {
        let mut map = test_map();
        let err = map.add_layer(RasterLayer::new("l", "s")).unwrap_err();
        assert_eq!(err, LayerError::UnknownSource("s".to_string()));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut map = test_map();
        map.add_source("s", source()).unwrap();
        assert_eq!(
            map.add_source("s", source()),
            Err(LayerError::DuplicateSource("s".to_string()))
        );

        map.add_layer(RasterLayer::new("l", "s")).unwrap();
        assert_eq!(
            map.add_layer(RasterLayer::new("l", "s")),
            Err(LayerError::DuplicateLayer("l".to_string()))
        );
    }

    #[test]
    fn test_source_in_use_cannot_be_removed() {
        let mut map = test_map();
        map.add_source("s", source()).unwrap();
        map.add_layer(RasterLayer::new("l", "s")).unwrap();

        assert_eq!(
            map.remove_source("s"),
            Err(LayerError::SourceInUse {
                source_id: "s".to_string(),
                layer_id: "l".to_string(),
            })
        );

        map.remove_layer("l").unwrap();
        map.remove_source("s").unwrap();
        assert!(!map.has_source("s"));
        assert!(map.layers().is_empty());
    }

    #[test]
    fn test_remove_unknown() {
        let mut map = test_map();
        assert_eq!(
            map.remove_layer("nope"),
            Err(LayerError::UnknownLayer("nope".to_string()))
        );
        assert_eq!(
            map.remove_source("nope"),
            Err(LayerError::UnknownSource("nope".to_string()))
        );
    }

    #[test]
    fn test_jump_queues_move_only_on_change() {
        let mut map = test_map();
        map.jump_to(Camera::new(51.0, -114.5, 15.0));
        map.jump_to(Camera::new(51.0, -114.5, 15.0));
        assert_eq!(map.drain_events(), vec![MapEvent::Move]);
        assert!(map.drain_events().is_empty());
        assert_eq!(map.camera(), Camera::new(51.0, -114.5, 15.0));
    }

    #[test]
    fn test_jump_moves_walkers_camera() {
        let mut map = test_map();
        map.jump_to(Camera::new(51.0, -114.5, 15.25));

        assert_eq!(map.memory.zoom(), 15.25);
        let center = map.memory.detached().unwrap();
        assert!((center.y() - 51.0).abs() < 1e-9);
        assert!((center.x() - -114.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_fires_once() {
        let mut map = test_map();
        assert!(!map.is_loaded());
        map.mark_loaded();
        map.mark_loaded();
        assert!(map.is_loaded());
        assert_eq!(map.drain_events(), vec![MapEvent::Load]);
    }

    #[test]
    fn test_frame_without_input_keeps_camera() {
        let mut map = test_map();
        map.add_source("s", source().with_zoom_range(15, 20)).unwrap();
        map.add_layer(RasterLayer::new("l", "s")).unwrap();
        let camera = map.camera();

        render_frame(&mut map);
        render_frame(&mut map);

        assert_eq!(map.drain_events(), vec![MapEvent::Load]);
        assert_eq!(map.camera(), camera);
        assert_eq!(map.memory.zoom(), 12.0);
    }
}
