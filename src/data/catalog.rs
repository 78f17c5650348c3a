//! Static dataset catalog.
//!
//! Each dataset is a tiled raster published under `/tiles/{name}/` plus the
//! full-resolution source file it was cut from.

/// A raster dataset that can be overlaid on the basemap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetEntry {
    /// Unique dataset name, also the tile directory name
    pub name: &'static str,
    /// Latitude of the dataset center
    pub lat: f64,
    /// Longitude of the dataset center
    pub lon: f64,
    /// File name of the full-resolution source on the data host
    pub file: &'static str,
}

impl DatasetEntry {
    /// Builds the direct download link for the dataset's source file.
    pub fn download_url(&self, data_host: &str) -> String {
        format!("{}/{}", data_host.trim_end_matches('/'), self.file)
    }
}

/// Dataset shown when the URL does not name a known one.
pub const DEFAULT_DATASET: &str = "Priddis";

pub static DATASETS: &[DatasetEntry] = &[
    DatasetEntry {
        name: "Priddis",
        lat: 50.8836,
        lon: -114.3267,
        file: "Priddis.tif",
    },
    DatasetEntry {
        name: "WaterValley",
        lat: 51.53558,
        lon: -114.6893865,
        file: "WaterValley.tif",
    },
];

/// Look up a dataset by name.
///
/// Exact matches win; otherwise the comparison is ASCII case-insensitive so
/// hand-typed URLs like `?Dataset=priddis` still resolve.
pub fn get_dataset(name: &str) -> Option<&'static DatasetEntry> {
    DATASETS
        .iter()
        .find(|d| d.name == name)
        .or_else(|| DATASETS.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
}

pub fn default_dataset() -> &'static DatasetEntry {
    // The default is part of the table above.
    get_dataset(DEFAULT_DATASET).unwrap_or(&DATASETS[0])
}
