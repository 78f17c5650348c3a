//! Browser geolocation lookups.
//!
//! The browser reports the position through callbacks; results are passed
//! back to egui's update loop over a channel and `ctx.request_repaint()`
//! wakes the UI.

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A position reported by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not available on this platform")]
    Unsupported,
    #[error("geolocation failed: {0}")]
    Failed(String),
}

pub type GeolocationResult = Result<GeoPosition, GeolocationError>;

/// Channel carrying geolocation results to the UI thread.
pub struct GeolocationChannel {
    sender: Sender<GeolocationResult>,
    receiver: Receiver<GeolocationResult>,
}

impl Default for GeolocationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Asks the browser for the current position. The answer (or error)
    /// arrives later through [`Self::try_recv`].
    #[cfg(target_arch = "wasm32")]
    pub fn request(&self, ctx: egui::Context) {
        if let Err(e) = request_position(self.sender.clone(), ctx.clone()) {
            let _ = self.sender.send(Err(e));
            ctx.request_repaint();
        }
    }

    /// Native builds have no position provider.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn request(&self, ctx: egui::Context) {
        let _ = self.sender.send(Err(GeolocationError::Unsupported));
        ctx.request_repaint();
    }

    /// Non-blocking check for a finished lookup.
    pub fn try_recv(&self) -> Option<GeolocationResult> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(target_arch = "wasm32")]
fn request_position(
    sender: Sender<GeolocationResult>,
    ctx: egui::Context,
) -> Result<(), GeolocationError> {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    let window = web_sys::window().ok_or(GeolocationError::Unsupported)?;
    let geolocation = window
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let on_error_sender = sender.clone();
    let on_error_ctx = ctx.clone();

    let success = Closure::once_into_js(move |position: JsValue| {
        let _ = sender.send(read_position(&position));
        ctx.request_repaint();
    });
    let failure = Closure::once_into_js(move |error: JsValue| {
        let message = js_sys::Reflect::get(&error, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| "unknown error".to_string());
        let _ = on_error_sender.send(Err(GeolocationError::Failed(message)));
        on_error_ctx.request_repaint();
    });

    let options = web_sys::PositionOptions::new();
    options.set_timeout(10_000);
    options.set_maximum_age(60_000);

    geolocation
        .get_current_position_with_error_callback_and_options(
            success.unchecked_ref(),
            Some(failure.unchecked_ref()),
            &options,
        )
        .map_err(|e| GeolocationError::Failed(format!("{:?}", e)))
}

#[cfg(target_arch = "wasm32")]
fn read_position(position: &wasm_bindgen::JsValue) -> GeolocationResult {
    use js_sys::Reflect;
    use wasm_bindgen::JsValue;

    let coords = Reflect::get(position, &JsValue::from_str("coords"))
        .map_err(|_| GeolocationError::Failed("missing coords".to_string()))?;
    let read = |key: &str| {
        Reflect::get(&coords, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite())
    };

    match (read("latitude"), read("longitude")) {
        (Some(lat), Some(lon)) => Ok(GeoPosition { lat, lon }),
        _ => Err(GeolocationError::Failed("invalid coordinates".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_reports_unsupported() {
        let channel = GeolocationChannel::new();
        assert!(channel.try_recv().is_none());

        channel.request(egui::Context::default());
        assert_eq!(channel.try_recv(), Some(Err(GeolocationError::Unsupported)));
        assert!(channel.try_recv().is_none());
    }
}
