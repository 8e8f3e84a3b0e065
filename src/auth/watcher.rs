//! Cross-tab logout propagation
//!
//! [`SharedStorage`] is the origin-wide storage area every tab can see. A
//! change made by one tab is announced to all the others through a broadcast
//! channel, mirroring the browser's storage-change notification. A logout is
//! signalled by writing [`LOGOUT_EVENT_KEY`] and removing it right away; the
//! transition is the signal, the value is only there to make it unique.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::{LogoutReason, SessionContext};

pub const LOGOUT_EVENT_KEY: &str = "logout_event";

const EVENT_CAPACITY: usize = 64;

/// Identity of one open tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A change to shared storage, delivered to every subscriber
#[derive(Debug, Clone)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Tab that made the change
    pub source: TabId,
}

/// Key/value storage shared by all tabs of the application
pub struct SharedStorage {
    items: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl SharedStorage {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            items: RwLock::new(HashMap::new()),
            events,
        })
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    /// Store a value. Writing the value already stored emits no event.
    pub fn set_item(&self, source: TabId, key: &str, value: &str) {
        let old_value = self.items.write().insert(key.to_string(), value.to_string());
        if old_value.as_deref() == Some(value) {
            return;
        }
        self.emit(StorageEvent {
            key: key.to_string(),
            old_value,
            new_value: Some(value.to_string()),
            source,
        });
    }

    /// Remove a value. Removing a missing key emits no event.
    pub fn remove_item(&self, source: TabId, key: &str) {
        let old_value = self.items.write().remove(key);
        if old_value.is_none() {
            return;
        }
        self.emit(StorageEvent {
            key: key.to_string(),
            old_value,
            new_value: None,
            source,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StorageEvent) {
        // No receivers just means no other tab is open
        let _ = self.events.send(event);
    }
}

/// One tab's handle on shared storage
#[derive(Clone)]
pub struct Tab {
    id: TabId,
    storage: Arc<SharedStorage>,
}

impl Tab {
    pub fn open(storage: &Arc<SharedStorage>) -> Self {
        Self {
            id: TabId::new(),
            storage: Arc::clone(storage),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn storage(&self) -> &Arc<SharedStorage> {
        &self.storage
    }

    /// Announce a logout to every other tab
    pub fn broadcast_logout(&self) {
        let stamp = format!("{}-{}", chrono::Utc::now().timestamp_millis(), Uuid::new_v4());
        self.storage.set_item(self.id, LOGOUT_EVENT_KEY, &stamp);
        self.storage.remove_item(self.id, LOGOUT_EVENT_KEY);
        debug!(tab = %self.id, "Logout broadcast");
    }
}

/// Whether `event` is another tab's logout signal, as seen by tab `own`.
/// Only the absent-to-present transition counts so each signal fires once.
pub fn is_remote_logout(event: &StorageEvent, own: TabId) -> bool {
    event.key == LOGOUT_EVENT_KEY && event.source != own && event.new_value.is_some()
}

/// Background listener that ends this tab's session when another tab logs out.
/// The listener lives exactly as long as this handle; dropping it stops the task.
pub struct SessionWatcher {
    task: JoinHandle<()>,
}

impl SessionWatcher {
    /// Start listening on `tab`'s shared storage. The subscription is taken
    /// before this returns, so no later signal is missed.
    pub fn spawn(tab: &Tab, context: SessionContext) -> Self {
        let own = tab.id();
        let mut events = tab.storage().subscribe();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if is_remote_logout(&event, own) {
                            info!(tab = %own, from = %event.source, "Logged out in another tab");
                            if let Err(e) = context.logout(LogoutReason::RemoteLogout) {
                                warn!("Remote logout incomplete: {}", e);
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(tab = %own, skipped, "Storage events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(tab = %own, "Session watcher stopped");
        });

        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
