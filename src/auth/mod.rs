//! Authentication and session lifecycle

pub mod context;
pub mod guard;
pub mod jwt;
pub mod models;
pub mod navigator;
pub mod session;
pub mod watcher;

pub use context::{LogoutReason, SessionContext};
pub use guard::{GuardOutcome, ProtectedRoute, RouteGuard, RouteTable};
pub use jwt::{peek_claims, AccessClaims};
pub use models::{LoginRequest, LoginResponse, Role, Session, SessionField};
pub use navigator::{
    Navigator, RecordingNavigator, LOGGED_OUT_ROUTE, LOGIN_ROUTE, UNAUTHORIZED_ROUTE,
};
pub use session::{FileSessionRepository, MemorySessionRepository, SessionRepository, TokenStore};
pub use watcher::{SessionWatcher, SharedStorage, StorageEvent, Tab, TabId, LOGOUT_EVENT_KEY};
