//! UI modules for the dataset viewer.
//!
//! The UI is split into:
//! - Top bar: title, dataset selector, share/locate/download actions, status
//! - Central canvas: the map with a camera readout
//! - Share dialog: modal with the shareable link and a copy button

mod canvas;
pub mod colors;
mod share_dialog;
mod top_bar;

pub use canvas::render_canvas;
pub use share_dialog::{render_share_dialog, render_toast};
pub use top_bar::{render_top_bar, TopBarAction};
