//! Interactive map widget.
//!
//! The widget owns the camera and a registry of raster tile sources and the
//! layers that draw them. Callers drive it through [`MapWidget`] and observe it
//! through the events it queues ([`MapEvent`]); `SlippyMap` is the egui
//! implementation used by the application.

mod slippy;
mod source;

pub use slippy::SlippyMap;
pub use source::{RasterLayer, RasterSource};

/// Lowest zoom level the widget accepts.
pub const MIN_ZOOM: f64 = 0.0;
/// Highest zoom level the widget accepts.
pub const MAX_ZOOM: f64 = 22.0;

/// Camera position of a map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

impl Camera {
    /// Creates a camera, clamping zoom and latitude and wrapping longitude
    /// into [-180, 180].
    pub fn new(lat: f64, lon: f64, zoom: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon: wrap_longitude(lon),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Events queued by a map widget, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// The widget finished its initial load. Fires once per instance.
    Load,
    /// The camera moved (user interaction or programmatic jump).
    Move,
}

/// Errors from source/layer management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("source '{0}' already exists")]
    DuplicateSource(String),
    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),
    #[error("source '{0}' does not exist")]
    UnknownSource(String),
    #[error("layer '{0}' does not exist")]
    UnknownLayer(String),
    #[error("source '{source_id}' is still used by layer '{layer_id}'")]
    SourceInUse { source_id: String, layer_id: String },
}

/// Operations the view synchronizer needs from a map widget.
pub trait MapWidget {
    /// The live camera.
    fn camera(&self) -> Camera;

    /// Moves the camera without animation.
    fn jump_to(&mut self, camera: Camera);

    /// Registers a raster source under `id`.
    fn add_source(&mut self, id: &str, source: RasterSource) -> Result<(), LayerError>;

    /// Removes a source. Fails while any layer still draws from it.
    fn remove_source(&mut self, id: &str) -> Result<(), LayerError>;

    fn has_source(&self, id: &str) -> bool;

    /// Adds a layer on top of the existing ones. Its source must exist.
    fn add_layer(&mut self, layer: RasterLayer) -> Result<(), LayerError>;

    fn remove_layer(&mut self, id: &str) -> Result<(), LayerError>;

    fn has_layer(&self, id: &str) -> bool;

    /// Takes all events queued since the last call.
    fn drain_events(&mut self) -> Vec<MapEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_clamps() {
        let camera = Camera::new(95.0, 10.0, 30.0);
        assert_eq!(camera.lat, 90.0);
        assert_eq!(camera.zoom, MAX_ZOOM);

        let camera = Camera::new(0.0, 0.0, -1.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_camera_wraps_longitude() {
        assert_eq!(Camera::new(0.0, 180.0, 1.0).lon, 180.0);
        assert_eq!(Camera::new(0.0, -180.0, 1.0).lon, -180.0);
        assert!((Camera::new(0.0, 190.0, 1.0).lon - -170.0).abs() < 1e-9);
        assert!((Camera::new(0.0, -190.0, 1.0).lon - 170.0).abs() < 1e-9);
        assert!((Camera::new(0.0, 540.0, 1.0).lon - -180.0).abs() < 1e-9);
    }
}
