//! URL state encoding/decoding for shareable URLs.
//!
//! Encodes dataset and map camera in the URL query string so reloading
//! restores the view and URLs can be shared.

use super::view::{POSITION_DIGITS, ZOOM_DIGITS};
use crate::map::{MAX_ZOOM, MIN_ZOOM};
use url::form_urlencoded;

/// Parsed URL parameters. Invalid values are already dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams {
    pub dataset: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<f64>,
}

impl UrlParams {
    /// Parse a query string (with or without the leading `?`).
    ///
    /// Both spellings of each key are accepted (`lat`/`Lat`, `lng`/`Lon`,
    /// `zoom`/`Zoom`); the first valid value wins. Numbers that do not parse,
    /// are not finite, or are out of range count as absent.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();

        let query = query.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "Dataset" => {
                    if params.dataset.is_none() && !value.trim().is_empty() {
                        params.dataset = Some(value.trim().to_string());
                    }
                }
                "lat" | "Lat" => {
                    params.lat = params.lat.or_else(|| parse_in_range(&value, -90.0, 90.0));
                }
                "lng" | "Lon" => {
                    params.lon = params.lon.or_else(|| parse_in_range(&value, -180.0, 180.0));
                }
                "zoom" | "Zoom" => {
                    params.zoom = params
                        .zoom
                        .or_else(|| parse_in_range(&value, MIN_ZOOM, MAX_ZOOM));
                }
                _ => {}
            }
        }

        params
    }

    /// Parse the query part of a full link. Input that is not an absolute URL
    /// is treated as a bare query string.
    pub fn from_link(link: &str) -> Self {
        match url::Url::parse(link) {
            Ok(url) => Self::parse(url.query().unwrap_or("")),
            Err(_) => Self::parse(link),
        }
    }
}

fn parse_in_range(value: &str, min: f64, max: f64) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

/// Query string for a view: `Dataset=..&lat=..&lng=..&zoom=..`.
///
/// Position is written with 4 decimals, zoom with 2.
pub fn view_query(dataset: &str, lat: f64, lon: f64, zoom: f64) -> String {
    let p = POSITION_DIGITS as usize;
    let z = ZOOM_DIGITS as usize;
    form_urlencoded::Serializer::new(String::new())
        .append_pair("Dataset", dataset)
        .append_pair("lat", &format!("{:.*}", p, lat))
        .append_pair("lng", &format!("{:.*}", p, lon))
        .append_pair("zoom", &format!("{:.*}", z, zoom))
        .finish()
}

/// Origin and path of the page links point back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme, host and port, e.g. `https://viewer.example.com`
    pub origin: String,
    /// Path of the page, e.g. `/` or `/viewer/`
    pub path: String,
}

impl PageLocation {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }

    /// Location of the current page.
    #[cfg(target_arch = "wasm32")]
    pub fn current() -> Option<Self> {
        let location = web_sys::window()?.location();
        let origin = location.origin().ok()?;
        let path = location.pathname().ok()?;
        Some(Self { origin, path })
    }

    /// Joins a query string onto this location.
    pub fn link(&self, query: &str) -> String {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        format!("{}{}?{}", self.origin.trim_end_matches('/'), path, query)
    }
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let Some(window) = web_sys::window() else {
        return UrlParams::default();
    };
    match window.location().search() {
        Ok(search) => UrlParams::parse(&search),
        Err(_) => UrlParams::default(),
    }
}

/// Replace the address bar query string using `replaceState`.
#[cfg(target_arch = "wasm32")]
pub fn push_to_url(query: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(history) = window.history() else {
        return;
    };
    if let Err(e) = history.replace_state_with_url(
        &wasm_bindgen::JsValue::NULL,
        "",
        Some(&format!("?{}", query)),
    ) {
        log::debug!("replaceState failed: {:?}", e);
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn push_to_url(_query: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capitalised_keys() {
        let params = UrlParams::parse("?Dataset=Priddis&Lat=50.90&Lon=-114.23&Zoom=16");
        assert_eq!(params.dataset.as_deref(), Some("Priddis"));
        assert_eq!(params.lat, Some(50.90));
        assert_eq!(params.lon, Some(-114.23));
        assert_eq!(params.zoom, Some(16.0));
    }

    #[test]
    fn test_parse_lowercase_keys() {
        let params = UrlParams::parse("lat=50.7214&lng=-113.3171&zoom=15.00");
        assert_eq!(params.dataset, None);
        assert_eq!(params.lat, Some(50.7214));
        assert_eq!(params.lon, Some(-113.3171));
        assert_eq!(params.zoom, Some(15.0));
    }

    #[test]
    fn test_invalid_numbers_are_absent() {
        let params = UrlParams::parse("lat=abc&lng=NaN&zoom=inf");
        assert_eq!(params, UrlParams::default());

        let params = UrlParams::parse("lat=&lng=1e400&zoom=-Infinity");
        assert_eq!(params, UrlParams::default());
    }

    #[test]
    fn test_out_of_range_is_absent() {
        let params = UrlParams::parse("lat=91&lng=-180.5&zoom=23");
        assert_eq!(params, UrlParams::default());
    }

    #[test]
    fn test_zero_is_valid() {
        let params = UrlParams::parse("lat=0&lng=0&zoom=0");
        assert_eq!(params.lat, Some(0.0));
        assert_eq!(params.lon, Some(0.0));
        assert_eq!(params.zoom, Some(0.0));
    }

    #[test]
    fn test_first_valid_value_wins() {
        let params = UrlParams::parse("lat=oops&Lat=51.5&lat=52.0");
        assert_eq!(params.lat, Some(51.5));
    }

    #[test]
    fn test_empty_dataset_is_absent() {
        assert_eq!(UrlParams::parse("Dataset=").dataset, None);
        assert_eq!(
            UrlParams::parse("Dataset=Water%20Valley").dataset.as_deref(),
            Some("Water Valley")
        );
    }

    #[test]
    fn test_from_link() {
        let params = UrlParams::from_link("https://viewer.test/map/?Dataset=WaterValley&zoom=15.5");
        assert_eq!(params.dataset.as_deref(), Some("WaterValley"));
        assert_eq!(params.zoom, Some(15.5));

        let params = UrlParams::from_link("lat=50&lng=-114");
        assert_eq!(params.lat, Some(50.0));
    }

    #[test]
    fn test_view_query_formatting() {
        let query = view_query("Priddis", 50.721358, -113.317054, 14.999);
        assert_eq!(query, "Dataset=Priddis&lat=50.7214&lng=-113.3171&zoom=15.00");
    }

    #[test]
    fn test_page_link() {
        let page = PageLocation::new("https://viewer.test", "/maps/");
        assert_eq!(page.link("a=1"), "https://viewer.test/maps/?a=1");

        let page = PageLocation::new("http://localhost:8080/", "");
        assert_eq!(page.link("a=1"), "http://localhost:8080/?a=1");
    }
}
