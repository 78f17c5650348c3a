//! Cached camera state shown in the UI and written to the address bar.

use crate::map::Camera;

/// Decimal digits kept for latitude/longitude.
pub const POSITION_DIGITS: i32 = 4;
/// Decimal digits kept for zoom.
pub const ZOOM_DIGITS: i32 = 2;

/// Last known camera position, rounded for display and URL stability.
///
/// The widget keeps full precision; this copy is only refreshed from camera
/// move events and dataset selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl ViewState {
    pub fn from_camera(camera: Camera) -> Self {
        Self {
            longitude: round_to(camera.lon, POSITION_DIGITS),
            latitude: round_to(camera.lat, POSITION_DIGITS),
            zoom: round_to(camera.zoom, ZOOM_DIGITS),
        }
    }
}

/// Rounds half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
