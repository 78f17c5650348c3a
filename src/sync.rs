//! View state synchronizer.
//!
//! [`ViewSync`] owns the map widget and keeps three things in step: the
//! camera (URL parameters on startup, widget events afterwards), the active
//! dataset, and the dataset source/layer pair registered on the widget.
//!
//! Layer operations are only valid once the widget has loaded. Switches
//! requested earlier are queued (the latest one wins) and applied when the
//! load event arrives.

use crate::data::{default_dataset, get_dataset, DatasetEntry};
use crate::map::{Camera, LayerError, MapEvent, MapWidget, RasterLayer, RasterSource, SlippyMap};
use crate::state::url_state::view_query;
use crate::state::{PageLocation, UrlParams, ViewState};
use eframe::egui;

/// Id of the source serving the active dataset's tiles.
pub const DATASET_SOURCE_ID: &str = "dataset";
/// Id of the raster layer drawing [`DATASET_SOURCE_ID`].
pub const DATASET_LAYER_ID: &str = "dataset-layer";
/// Dataset tiles exist from this level...
pub const DATASET_MIN_ZOOM: u8 = 15;
/// ...up to this one.
pub const DATASET_MAX_ZOOM: u8 = 20;
/// Zoom used when the URL does not give one.
pub const DEFAULT_ZOOM: f64 = 12.0;
/// Zoom applied when the user picks a dataset.
pub const SELECTION_ZOOM: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// Tile source for a dataset, resolved against `tile_origin`.
pub fn dataset_source(tile_origin: &str, dataset: &DatasetEntry) -> RasterSource {
    RasterSource::new(tile_origin, format!("/tiles/{}/{{z}}/{{x}}/{{y}}.png", dataset.name))
        .with_zoom_range(DATASET_MIN_ZOOM, DATASET_MAX_ZOOM)
}

/// Owns the map widget and reconciles it with URL and UI state.
pub struct ViewSync<M> {
    map: M,
    view: ViewState,
    dataset: &'static DatasetEntry,
    ready: bool,
    /// Switch waiting for the load event
    pending: Option<&'static DatasetEntry>,
    tile_origin: String,
}

impl<M: MapWidget> ViewSync<M> {
    /// Resolves the startup camera and dataset from `params`, builds the
    /// widget with `construct`, and queues the dataset layer.
    ///
    /// Each coordinate falls back independently: a missing latitude uses the
    /// dataset center's latitude even when a longitude was given.
    pub fn initialize(
        params: &UrlParams,
        tile_origin: impl Into<String>,
        construct: impl FnOnce(Camera) -> M,
    ) -> Self {
        let dataset = match params.dataset.as_deref() {
            Some(name) => get_dataset(name).unwrap_or_else(|| {
                log::warn!("Unknown dataset '{}' in URL, using default", name);
                default_dataset()
            }),
            None => default_dataset(),
        };

        let camera = Camera::new(
            params.lat.unwrap_or(dataset.lat),
            params.lon.unwrap_or(dataset.lon),
            params.zoom.unwrap_or(DEFAULT_ZOOM),
        );
        log::info!(
            "Starting at {:.4}, {:.4} zoom {:.2} with dataset {}",
            camera.lat,
            camera.lon,
            camera.zoom,
            dataset.name
        );

        let mut sync = Self {
            map: construct(camera),
            view: ViewState::from_camera(camera),
            dataset,
            ready: false,
            pending: None,
            tile_origin: tile_origin.into(),
        };
        // Not ready yet, so this only queues.
        if let Err(e) = sync.request_switch(dataset) {
            log::error!("Failed to queue dataset {}: {}", dataset.name, e);
        }
        sync
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn active_dataset(&self) -> &'static DatasetEntry {
        self.dataset
    }

    /// Whether the widget has loaded and layer operations apply directly.
    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Explicit dataset selection from the UI.
    ///
    /// Recenters on the dataset at [`SELECTION_ZOOM`] and replaces the dataset
    /// layer (or queues the replacement if the widget has not loaded).
    pub fn select_dataset(&mut self, name: &str) -> Result<(), SyncError> {
        let dataset = get_dataset(name).ok_or_else(|| SyncError::UnknownDataset(name.to_string()))?;

        self.dataset = dataset;
        self.jump(Camera::new(dataset.lat, dataset.lon, SELECTION_ZOOM));
        self.request_switch(dataset)?;
        Ok(())
    }

    /// Moves the camera to a point, keeping the current zoom.
    pub fn recenter(&mut self, lat: f64, lon: f64) {
        let zoom = self.map.camera().zoom;
        self.jump(Camera::new(lat, lon, zoom));
    }

    /// Link reproducing the live camera and active dataset.
    pub fn shareable_link(&self, page: &PageLocation) -> String {
        let camera = self.map.camera();
        page.link(&view_query(self.dataset.name, camera.lat, camera.lon, camera.zoom))
    }

    /// Query string of the cached view, for the address bar.
    pub fn view_query(&self) -> String {
        view_query(
            self.dataset.name,
            self.view.latitude,
            self.view.longitude,
            self.view.zoom,
        )
    }

    /// Dispatches every event the widget queued since the last call.
    pub fn pump_events(&mut self) {
        for event in self.map.drain_events() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Move => {
                self.view = ViewState::from_camera(self.map.camera());
            }
            MapEvent::Load => {
                if self.ready {
                    return;
                }
                self.ready = true;
                log::debug!("Map loaded");

                if let Some(dataset) = self.pending.take() {
                    if let Err(e) = self.replace_dataset_layer(dataset) {
                        log::error!("Failed to show dataset {}: {}", dataset.name, e);
                    }
                }
            }
        }
    }

    fn jump(&mut self, camera: Camera) {
        self.map.jump_to(camera);
        self.view = ViewState::from_camera(self.map.camera());
    }

    fn request_switch(&mut self, dataset: &'static DatasetEntry) -> Result<(), LayerError> {
        if self.ready {
            self.replace_dataset_layer(dataset)
        } else {
            log::debug!("Map not loaded, deferring switch to {}", dataset.name);
            self.pending = Some(dataset);
            Ok(())
        }
    }

    /// Swaps the dataset source/layer pair. The layer goes first since a
    /// source cannot be removed while a layer draws from it.
    fn replace_dataset_layer(&mut self, dataset: &DatasetEntry) -> Result<(), LayerError> {
        if self.map.has_layer(DATASET_LAYER_ID) {
            self.map.remove_layer(DATASET_LAYER_ID)?;
        }
        if self.map.has_source(DATASET_SOURCE_ID) {
            self.map.remove_source(DATASET_SOURCE_ID)?;
        }

        self.map
            .add_source(DATASET_SOURCE_ID, dataset_source(&self.tile_origin, dataset))?;
        self.map
            .add_layer(RasterLayer::new(DATASET_LAYER_ID, DATASET_SOURCE_ID))?;

        log::info!("Showing dataset {}", dataset.name);
        Ok(())
    }
}

impl ViewSync<SlippyMap> {
    /// Renders the map and handles the events it produced this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let response = self.map.show(ui);
        self.pump_events();
        response
    }
}
