//! Centralized color constants for the UI.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Emphasized color for the active dataset.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
    /// Confirmation toast text.
    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
}

/// Colors drawn on top of the map.
pub mod overlay {
    use super::Color32;

    /// Background of the camera readout.
    pub const READOUT_BG: Color32 = Color32::from_rgba_premultiplied(20, 20, 30, 200);
    /// Readout text.
    pub const READOUT_TEXT: Color32 = Color32::from_rgb(220, 220, 230);
}
