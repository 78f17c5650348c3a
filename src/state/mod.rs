//! Application state management.
//!
//! UI-facing state lives here. Camera and dataset state are owned by the
//! view synchronizer in [`crate::sync`].

mod settings;
pub mod url_state;
mod view;

pub use settings::ViewerSettings;
pub use url_state::{PageLocation, UrlParams};
pub use view::ViewState;

use web_time::{Duration, Instant};

/// How long the "copied" toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Root application state for everything outside the map.
#[derive(Default)]
pub struct AppState {
    /// Application status message displayed in top bar
    pub status_message: String,

    /// Link shown in the share dialog; `Some` while the dialog is open
    pub share_link: Option<String>,

    /// When the clipboard toast should disappear
    pub toast_until: Option<Instant>,

    /// Hosts and behaviour toggles
    pub settings: ViewerSettings,
}

impl AppState {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            status_message: "Ready".to_string(),
            settings,
            ..Default::default()
        }
    }

    pub fn open_share_dialog(&mut self, link: String) {
        self.share_link = Some(link);
    }

    pub fn close_share_dialog(&mut self) {
        self.share_link = None;
    }

    /// Starts the toast timer.
    pub fn show_toast(&mut self, now: Instant) {
        self.toast_until = Some(now + TOAST_DURATION);
    }

    /// Whether the toast is visible at `now`; clears it once expired.
    pub fn toast_visible(&mut self, now: Instant) -> bool {
        match self.toast_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.toast_until = None;
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let mut state = AppState::new(ViewerSettings::default());
        let now = Instant::now();
        assert!(!state.toast_visible(now));

        state.show_toast(now);
        assert!(state.toast_visible(now + Duration::from_millis(1999)));
        assert!(!state.toast_visible(now + TOAST_DURATION));
        assert!(state.toast_until.is_none());
    }

    #[test]
    fn test_share_dialog() {
        let mut state = AppState::new(ViewerSettings::default());
        state.open_share_dialog("https://viewer.test/?a=1".to_string());
        assert_eq!(state.share_link.as_deref(), Some("https://viewer.test/?a=1"));
        state.close_share_dialog();
        assert!(state.share_link.is_none());
    }
}
