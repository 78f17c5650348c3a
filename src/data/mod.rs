//! Static data compiled into the application.
//!
//! - `catalog`: raster datasets available as tile overlays

pub mod catalog;

pub use catalog::{default_dataset, get_dataset, DatasetEntry, DATASETS};
