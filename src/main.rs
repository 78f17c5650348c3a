#![warn(clippy::all)]

//! Dataset Viewer - a web-based map viewer for tiled raster datasets.
//!
//! Shows a basemap with one dataset overlay at a time. The view (dataset,
//! position and zoom) is encoded in the URL so it can be reloaded or shared.

mod data;
mod geolocation;
mod map;
mod state;
mod sync;
mod ui;

use eframe::egui;
use geolocation::{GeolocationChannel, GeolocationError};
use map::{RasterSource, SlippyMap};
use state::{AppState, PageLocation, UrlParams, ViewerSettings};
use sync::ViewSync;
use web_time::{Duration, Instant};

/// Minimum time between address bar updates.
const URL_PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Command-line arguments for the native viewer.
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(name = "dataset-viewer", about = "Map viewer for tiled raster datasets")]
struct ViewerArgs {
    /// Shared link (or bare query string) to open, e.g. "?Dataset=Priddis&zoom=16"
    link: Option<String>,
}

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    use clap::Parser as _;

    env_logger::init();

    let args = ViewerArgs::parse();
    let params = args
        .link
        .as_deref()
        .map(UrlParams::from_link)
        .unwrap_or_default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Dataset Viewer")
            .with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dataset Viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, params)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| {
                    let params = state::url_state::parse_from_url();
                    Ok(Box::new(ViewerApp::new(cc, params)))
                }),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct ViewerApp {
    /// UI state outside the map (status, share dialog, settings)
    state: AppState,

    /// Owns the map widget and the camera/dataset state
    sync: ViewSync<SlippyMap>,

    /// Channel for async geolocation lookups
    geolocation: GeolocationChannel,

    /// Last address bar update (for throttling to ~1/sec)
    last_url_push: Instant,

    /// Query string last written to the address bar
    last_pushed_query: String,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, params: UrlParams) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let settings = ViewerSettings::load();
        let tile_origin = settings.resolved_tile_origin();
        log::info!("Tiles served from {}", tile_origin);

        let basemap = RasterSource::new("", settings.basemap_url.clone());
        let attribution = settings.basemap_attribution.clone();
        let sync = ViewSync::initialize(&params, tile_origin, |camera| {
            SlippyMap::new(camera, basemap, attribution)
        });

        let mut state = AppState::new(settings);
        state.status_message = format!("Showing {}", sync.active_dataset().name);

        Self {
            state,
            sync,
            geolocation: GeolocationChannel::new(),
            last_url_push: Instant::now(),
            last_pushed_query: String::new(),
        }
    }

    /// Link to the current view, relative to the page this app was served from.
    fn shareable_link(&self) -> String {
        self.sync.shareable_link(&current_page(&self.state.settings))
    }

    fn handle_geolocation(&mut self) {
        let Some(result) = self.geolocation.try_recv() else {
            return;
        };
        match result {
            Ok(position) => {
                log::info!("Located at {:.4}, {:.4}", position.lat, position.lon);
                self.sync.recenter(position.lat, position.lon);
                self.state.status_message = "Centered on your location".to_string();
            }
            Err(GeolocationError::Unsupported) => {
                log::warn!("Geolocation is not available");
                self.state.status_message = "Location not available".to_string();
            }
            Err(e) => {
                log::warn!("{}", e);
                self.state.status_message = "Could not determine location".to_string();
            }
        }
    }

    /// Write the view to the address bar, at most once per interval and only
    /// when it changed.
    fn sync_address_bar(&mut self, ctx: &egui::Context) {
        if !self.state.settings.sync_address_bar {
            return;
        }
        let query = self.sync.view_query();
        if query == self.last_pushed_query {
            return;
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_url_push);
        if elapsed < URL_PUSH_INTERVAL {
            // Come back for the trailing update
            ctx.request_repaint_after(URL_PUSH_INTERVAL - elapsed);
        } else {
            self.last_url_push = now;
            state::url_state::push_to_url(&query);
            self.last_pushed_query = query;
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn current_page(_settings: &ViewerSettings) -> PageLocation {
    PageLocation::current().unwrap_or_else(|| PageLocation::new("", "/"))
}

#[cfg(not(target_arch = "wasm32"))]
fn current_page(settings: &ViewerSettings) -> PageLocation {
    PageLocation::new(settings.resolved_tile_origin(), "/")
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_geolocation();

        // Top/bottom panels must be rendered before CentralPanel
        match ui::render_top_bar(ctx, &mut self.state, &mut self.sync) {
            Some(ui::TopBarAction::Share) => {
                let link = self.shareable_link();
                log::debug!("Share link: {}", link);
                self.state.open_share_dialog(link);
            }
            Some(ui::TopBarAction::Locate) => {
                self.state.status_message = "Locating...".to_string();
                self.geolocation.request(ctx.clone());
            }
            None => {}
        }

        ui::render_canvas(ctx, &mut self.sync);
        ui::render_share_dialog(ctx, &mut self.state);
        ui::render_toast(ctx, &mut self.state);

        self.sync_address_bar(ctx);
    }
}
