//! Raster tile sources and the layers that draw them.

use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

/// A templated XYZ tile endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSource {
    /// Scheme and host prepended to `path` (may be empty when `path` is absolute)
    pub origin: String,
    /// Path template containing `{z}`, `{x}` and `{y}`
    pub path: String,
    /// Below this zoom the source draws nothing
    pub min_zoom: u8,
    /// Above this zoom the tiles of this level are scaled up
    pub max_zoom: u8,
}

impl RasterSource {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
            min_zoom: 0,
            max_zoom: 19,
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    /// Whether the source draws anything at a camera zoom.
    pub fn visible_at(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom as f64
    }
}

impl TileSource for RasterSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        let path = self
            .path
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string());
        format!("{}{}", self.origin.trim_end_matches('/'), path)
    }

    // The map draws its own attribution line from settings.
    fn attribution(&self) -> Attribution {
        Attribution {
            text: "",
            url: "",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// A layer drawing one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterLayer {
    pub id: String,
    pub source: String,
}

impl RasterLayer {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}
