//! Route guard behaviour across the whole route table
//!
//! Run with: cargo test --test route_guard_tests

mod common;

use common::{MockBackend, ADMIN_EMAIL, PASSWORD, STUDENT_EMAIL};
use edulog::auth::{
    GuardOutcome, MemorySessionRepository, RecordingNavigator, Role, RouteGuard, RouteTable,
    SessionContext, TokenStore, LOGIN_ROUTE, UNAUTHORIZED_ROUTE,
};
use std::sync::Arc;

fn guard_over(entries: &[(&str, &str)]) -> (RouteGuard, TokenStore, Arc<RecordingNavigator>) {
    let repo = MemorySessionRepository::with_entries(entries.iter().copied());
    let store = TokenStore::new(Arc::new(repo));
    let navigator = Arc::new(RecordingNavigator::new());
    let context = SessionContext::new(store.clone(), navigator.clone());
    (RouteGuard::new(RouteTable::standard(), context), store, navigator)
}

fn protected_paths() -> Vec<String> {
    RouteTable::standard()
        .protected_routes()
        .iter()
        .map(|r| r.path.clone())
        .collect()
}

#[test]
fn test_no_token_never_renders_protected_routes() {
    for path in protected_paths() {
        let (guard, _, _) = guard_over(&[("role", "admin")]);
        assert_eq!(guard.check(&path), GuardOutcome::RedirectToLogin, "{}", path);
    }
}

#[test]
fn test_incomplete_student_is_sent_to_login_everywhere() {
    for path in protected_paths() {
        let (guard, store, navigator) = guard_over(&[
            ("access_token", "t"),
            ("refresh_token", "r"),
            ("role", "student"),
        ]);

        let outcome = guard.enter(&path);

        assert_eq!(outcome, GuardOutcome::RedirectToLogin, "{}", path);
        assert!(store.access_token().is_none(), "{} left a token behind", path);
        assert!(store.role().is_none());
        assert_eq!(navigator.history(), vec![LOGIN_ROUTE.to_string()]);
    }
}

#[test]
fn test_renders_only_for_allowed_roles() {
    let table = RouteTable::standard();
    for route in table.protected_routes() {
        for role in [Role::Admin, Role::Student] {
            let (guard, _, _) = guard_over(&[
                ("access_token", "t"),
                ("role", role.as_str()),
                ("student_id", "S001"),
            ]);
            let outcome = guard.check(&route.path);
            if route.allows(role) {
                assert_eq!(outcome, GuardOutcome::Render(route.path.clone()));
            } else {
                assert_eq!(outcome, GuardOutcome::RedirectToUnauthorized, "{} as {}", route.path, role);
            }
        }
    }
}

#[test]
fn test_unauthorized_does_not_touch_session() {
    let (guard, store, navigator) =
        guard_over(&[("access_token", "t"), ("refresh_token", "r"), ("role", "admin")]);

    let outcome = guard.enter("/studentHome");

    assert_eq!(outcome, GuardOutcome::RedirectToUnauthorized);
    assert_eq!(store.access_token().as_deref(), Some("t"));
    assert_eq!(navigator.current().as_deref(), Some(UNAUTHORIZED_ROUTE));
}

#[test]
fn test_unknown_routes_fall_back_to_login() {
    let (guard, _, _) = guard_over(&[("access_token", "t"), ("role", "admin")]);
    for path in ["/admin", "/studenthome", "/api/login", "/nowhere/at/all"] {
        assert_eq!(guard.check(path), GuardOutcome::RedirectToLogin, "{}", path);
    }
}

#[test]
fn test_query_and_trailing_slash_are_ignored() {
    let (guard, _, _) = guard_over(&[("access_token", "t"), ("role", "admin")]);
    assert_eq!(
        guard.check("/reports/?from=2024-09-01"),
        GuardOutcome::Render("/reports".to_string())
    );
    assert_eq!(
        guard.check("/login?reason=logged_out"),
        GuardOutcome::Render(LOGIN_ROUTE.to_string())
    );
}

#[tokio::test]
async fn test_admin_login_scenario() {
    let backend = MockBackend::start().await;
    let (client, navigator) = backend.client();
    let session = client.login(ADMIN_EMAIL, PASSWORD).await.expect("login");

    let guard = RouteGuard::new(RouteTable::standard(), client.session().clone());

    assert!(guard.enter(session.landing_route()).is_render());
    assert!(guard.enter("/reports").is_render());
    assert_eq!(guard.enter("/studentHome"), GuardOutcome::RedirectToUnauthorized);
    assert_eq!(
        navigator.history(),
        vec![
            "/adminHome".to_string(),
            "/reports".to_string(),
            UNAUTHORIZED_ROUTE.to_string()
        ]
    );
}

#[tokio::test]
async fn test_student_login_scenario() {
    let backend = MockBackend::start().await;
    let (client, _) = backend.client();
    client.login(STUDENT_EMAIL, PASSWORD).await.expect("login");

    let guard = RouteGuard::new(RouteTable::standard(), client.session().clone());

    assert!(guard.check("/studentHome").is_render());
    assert!(guard.check("/calendarPage").is_render());
    assert_eq!(guard.check("/adminHome"), GuardOutcome::RedirectToUnauthorized);
    assert!(client.session().store().is_authenticated());
}
