//! Per-tab session context and the logout path

use std::sync::Arc;
use tracing::{info, warn};

use super::navigator::{Navigator, LOGGED_OUT_ROUTE, LOGIN_ROUTE};
use super::session::TokenStore;
use super::watcher::Tab;
use crate::error::Result;

/// Why a session is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out
    UserInitiated,
    /// Refresh failed or the retried request was rejected again
    SessionExpired,
    /// Student session without a student identity
    IncompleteSession,
    /// Another tab logged out
    RemoteLogout,
}

impl LogoutReason {
    /// Only an explicit logout is announced to other tabs
    pub fn broadcasts(&self) -> bool {
        matches!(self, LogoutReason::UserInitiated)
    }

    /// Where the tab goes afterwards. The route guard navigates by itself
    /// for incomplete sessions.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            LogoutReason::UserInitiated | LogoutReason::SessionExpired => Some(LOGIN_ROUTE),
            LogoutReason::RemoteLogout => Some(LOGGED_OUT_ROUTE),
            LogoutReason::IncompleteSession => None,
        }
    }
}

/// Everything one tab needs to manage its session: the token store, a way
/// to navigate, and optionally the tab's handle on shared storage.
#[derive(Clone)]
pub struct SessionContext {
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    tab: Option<Tab>,
}

impl SessionContext {
    pub fn new(store: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            tab: None,
        }
    }

    /// Attach the tab used to announce logouts
    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = Some(tab);
        self
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn tab(&self) -> Option<&Tab> {
        self.tab.as_ref()
    }

    pub fn navigate(&self, location: &str) {
        self.navigator.navigate(location);
    }

    /// Clear the session, announce it if the reason calls for it, and
    /// redirect. Safe to call repeatedly.
    pub fn logout(&self, reason: LogoutReason) -> Result<()> {
        info!(?reason, "Ending session");

        let cleared = self.store.clear();
        if let Err(e) = &cleared {
            warn!("Failed to clear session storage: {}", e);
        }

        if reason.broadcasts() {
            if let Some(tab) = &self.tab {
                tab.broadcast_logout();
            }
        }

        if let Some(location) = reason.redirect() {
            self.navigator.navigate(location);
        }

        cleared
    }
}
