//! Viewer configuration.
//!
//! On the web, settings are read from localStorage so a deployment can point
//! the viewer at different hosts without rebuilding. Native builds read
//! `VIEWER_*` environment variables.

use serde::{Deserialize, Serialize};

/// Host serving the full-resolution dataset files.
pub const DEFAULT_DATA_HOST: &str = "http://albedo-sim-data.s3-website-us-west-2.amazonaws.com";

/// Tile origin for native builds, matching the tile proxy's default listen address.
pub const NATIVE_TILE_ORIGIN: &str = "http://localhost:8080";

/// Hosts and behaviour toggles for the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// `{z}/{x}/{y}` template of the basemap tiles.
    pub basemap_url: String,
    /// Attribution drawn in the map corner.
    pub basemap_attribution: String,
    /// Origin serving `/tiles/...`. `None` means the page's own origin.
    pub tile_origin: Option<String>,
    /// Host serving the dataset source files.
    pub data_host: String,
    /// Keep the address bar query string in step with the camera.
    pub sync_address_bar: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            basemap_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            basemap_attribution: "© OpenStreetMap contributors".to_string(),
            tile_origin: None,
            data_host: DEFAULT_DATA_HOST.to_string(),
            sync_address_bar: true,
        }
    }
}

impl ViewerSettings {
    /// localStorage key for persisted settings.
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "dataset_viewer_settings";

    /// Load settings from localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return Self::default(),
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        let json = match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        Self::from_json(&json)
    }

    /// Load settings from `VIEWER_*` environment variables.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON settings blob; missing fields keep their defaults.
    #[cfg(any(target_arch = "wasm32", test))]
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => {
                log::info!("Loaded viewer settings");
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse viewer settings: {}", e);
                Self::default()
            }
        }
    }

    /// Apply overrides from an environment-style lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(url) = lookup("VIEWER_BASEMAP_URL") {
            settings.basemap_url = url;
        }
        if let Some(text) = lookup("VIEWER_BASEMAP_ATTRIBUTION") {
            settings.basemap_attribution = text;
        }
        if let Some(origin) = lookup("VIEWER_TILE_ORIGIN") {
            settings.tile_origin = Some(origin);
        }
        if let Some(host) = lookup("VIEWER_DATA_HOST") {
            settings.data_host = host;
        }
        if let Some(flag) = lookup("VIEWER_SYNC_ADDRESS_BAR") {
            settings.sync_address_bar = !matches!(flag.as_str(), "0" | "false" | "no");
        }
        settings
    }

    /// Origin that tile paths are resolved against.
    pub fn resolved_tile_origin(&self) -> String {
        if let Some(origin) = &self.tile_origin {
            return origin.clone();
        }
        page_origin()
    }
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> String {
    NATIVE_TILE_ORIGIN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = ViewerSettings::from_json(r#"{"data_host": "http://files.test"}"#);
        assert_eq!(settings.data_host, "http://files.test");
        assert_eq!(settings.basemap_url, ViewerSettings::default().basemap_url);
        assert!(settings.sync_address_bar);
    }

    #[test]
    fn test_bad_json_falls_back() {
        assert_eq!(ViewerSettings::from_json("{not json"), ViewerSettings::default());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VIEWER_TILE_ORIGIN", "http://proxy.test:9000"),
            ("VIEWER_SYNC_ADDRESS_BAR", "false"),
        ]
        .into_iter()
        .collect();

        let settings = ViewerSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.tile_origin.as_deref(), Some("http://proxy.test:9000"));
        assert_eq!(settings.resolved_tile_origin(), "http://proxy.test:9000");
        assert!(!settings.sync_address_bar);
        assert_eq!(settings.data_host, DEFAULT_DATA_HOST);
    }

    #[test]
    fn test_native_origin_default() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.resolved_tile_origin(), NATIVE_TILE_ORIGIN);
    }
}
