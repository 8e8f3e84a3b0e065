//! Role-gated navigation
//!
//! Each navigation attempt is evaluated synchronously against the current
//! token store:
//!
//! 1. no access token: redirect to login
//! 2. student role without a student id: clear the session, redirect to login
//! 3. role not allowed for the route: redirect to the unauthorized view
//! 4. otherwise render
//!
//! The incomplete-student check runs before the role check so a broken
//! student session is always sent back to login, whatever the route.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::context::{LogoutReason, SessionContext};
use super::models::Role;
use super::navigator::{LOGIN_ROUTE, UNAUTHORIZED_ROUTE};

/// A route and the roles allowed to open it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub path: String,
    pub allowed_roles: BTreeSet<Role>,
}

impl ProtectedRoute {
    pub fn new(path: impl Into<String>, roles: &[Role]) -> Self {
        Self {
            path: path.into(),
            allowed_roles: roles.iter().copied().collect(),
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

/// Result of matching a path against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Public(&'static str),
    Protected(&'a ProtectedRoute),
    Unknown,
}

/// Static routing configuration, built once at startup
#[derive(Debug, Clone)]
pub struct RouteTable {
    protected: Vec<ProtectedRoute>,
}

const PUBLIC_ROUTES: [&str; 3] = [LOGIN_ROUTE, "/register", UNAUTHORIZED_ROUTE];

impl RouteTable {
    pub fn new(protected: Vec<ProtectedRoute>) -> Self {
        Self { protected }
    }

    /// The application's screens
    pub fn standard() -> Self {
        use Role::*;
        Self::new(vec![
            ProtectedRoute::new("/adminHome", &[Admin]),
            ProtectedRoute::new("/attendance", &[Admin]),
            ProtectedRoute::new("/studentsManagement", &[Admin]),
            ProtectedRoute::new("/reports", &[Admin]),
            ProtectedRoute::new("/profile", &[Admin]),
            ProtectedRoute::new("/studentHome", &[Student]),
            ProtectedRoute::new("/studentProfile", &[Student]),
            ProtectedRoute::new("/calendarPage", &[Admin, Student]),
        ])
    }

    pub fn protected_routes(&self) -> &[ProtectedRoute] {
        &self.protected
    }

    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        let path = normalize(path);
        if path == "/" {
            return RouteMatch::Public(LOGIN_ROUTE);
        }
        if let Some(public) = PUBLIC_ROUTES.iter().find(|p| **p == path) {
            return RouteMatch::Public(*public);
        }
        self.protected
            .iter()
            .find(|r| r.path == path)
            .map(RouteMatch::Protected)
            .unwrap_or(RouteMatch::Unknown)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Drop the query string and any trailing slash
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// What to show for a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the requested view
    Render(String),
    RedirectToLogin,
    RedirectToUnauthorized,
}

impl GuardOutcome {
    /// The location the tab ends up at
    pub fn location(&self) -> &str {
        match self {
            GuardOutcome::Render(path) => path,
            GuardOutcome::RedirectToLogin => LOGIN_ROUTE,
            GuardOutcome::RedirectToUnauthorized => UNAUTHORIZED_ROUTE,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, GuardOutcome::Render(_))
    }
}

pub struct RouteGuard {
    table: RouteTable,
    context: SessionContext,
}

impl RouteGuard {
    pub fn new(table: RouteTable, context: SessionContext) -> Self {
        Self { table, context }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide the outcome for `path`. Only an incomplete student session
    /// mutates state (it is cleared).
    pub fn check(&self, path: &str) -> GuardOutcome {
        let route = match self.table.resolve(path) {
            RouteMatch::Public(public) => return GuardOutcome::Render(public.to_string()),
            RouteMatch::Unknown => {
                debug!(path, "Unknown route");
                return GuardOutcome::RedirectToLogin;
            }
            RouteMatch::Protected(route) => route,
        };

        let store = self.context.store();
        if store.access_token().is_none() {
            debug!(path, "No access token");
            return GuardOutcome::RedirectToLogin;
        }

        let role = store.role();
        if role == Some(Role::Student) && store.student_id().is_none() {
            warn!(path, "Student session incomplete");
            // Clearing is best effort; the redirect happens either way
            let _ = self.context.logout(LogoutReason::IncompleteSession);
            return GuardOutcome::RedirectToLogin;
        }

        match role {
            Some(role) if route.allows(role) => GuardOutcome::Render(route.path.clone()),
            _ => {
                debug!(path, ?role, "Role not allowed");
                GuardOutcome::RedirectToUnauthorized
            }
        }
    }

    /// Check `path` and navigate to wherever the check leads
    pub fn enter(&self, path: &str) -> GuardOutcome {
        let outcome = self.check(path);
        self.context.navigate(outcome.location());
        outcome
    }
}
