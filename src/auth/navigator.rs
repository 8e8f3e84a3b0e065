//! Navigation capability
//!
//! Redirects are requested through a [`Navigator`] instead of a global
//! location so callers decide what "going to the login screen" means.

use parking_lot::Mutex;

pub const LOGIN_ROUTE: &str = "/login";
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";
pub const LOGGED_OUT_ROUTE: &str = "/login?reason=logged_out";

pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Remembers every location it was sent to
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Most recent location, if any
    pub fn current(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        tracing::debug!(location, "navigate");
        self.history.lock().push(location.to_string());
    }
}
