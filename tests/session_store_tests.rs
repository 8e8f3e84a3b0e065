//! File-backed session persistence and config loading, as used by the CLI
//!
//! Run with: cargo test --test session_store_tests

mod common;

use common::{admin_session, MockBackend, PASSWORD, STUDENT_EMAIL};
use edulog::auth::{
    FileSessionRepository, RecordingNavigator, Role, SessionContext, SessionField, TokenStore,
};
use edulog::config::loader::{
    default_config_content, find_config_file, load_config_from_path, save_config, CONFIG_FILENAME,
};
use edulog::{ApiClient, Config};
use std::sync::Arc;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> TokenStore {
    let path = dir.path().join("state").join("session.json");
    TokenStore::new(Arc::new(FileSessionRepository::new(path)))
}

#[test]
fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    file_store(&dir).set(&admin_session("tok", "ref")).unwrap();

    let reopened = file_store(&dir);
    let session = reopened.session().expect("session on disk");
    assert_eq!(session.access_token, "tok");
    assert_eq!(session.role, Role::Admin);
    assert!(reopened.get(SessionField::TokenTimestamp).is_some());
}

#[test]
fn test_clear_removes_file_and_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set(&admin_session("tok", "ref")).unwrap();

    store.clear().unwrap();
    store.clear().unwrap();

    assert!(!dir.path().join("state").join("session.json").exists());
    assert!(file_store(&dir).session().is_none());
}

#[tokio::test]
async fn test_login_persists_to_disk() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let context = SessionContext::new(file_store(&dir), Arc::new(RecordingNavigator::new()));
    let client = ApiClient::new(&backend.base_url, context).unwrap();

    client.login(STUDENT_EMAIL, PASSWORD).await.unwrap();

    let reopened = file_store(&dir);
    assert_eq!(reopened.role(), Some(Role::Student));
    assert_eq!(reopened.student_id().as_deref(), Some("S001"));

    client.logout().unwrap();
    assert!(file_store(&dir).session().is_none());
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edulog.toml");

    let mut config = Config::with_base_url("https://school.example/edulog");
    config.session.path = dir.path().join("session.json");
    save_config(&config, &path).unwrap();

    let loaded = load_config_from_path(&path).unwrap();
    assert_eq!(loaded.api.base_url, "https://school.example/edulog");
    assert_eq!(loaded.session.path, config.session.path);
}

#[test]
fn test_default_config_template_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edulog.toml");
    std::fs::write(&path, default_config_content()).unwrap();

    let loaded = load_config_from_path(&path).unwrap();
    assert!(loaded.api.base_url.starts_with("http"));
    assert_eq!(loaded.session.path, dir.path().join(".edulog/session.json"));
}

#[tokio::test]
async fn test_runs_from_subdirectories_share_one_session() {
    let backend = MockBackend::start().await;
    let project = TempDir::new().unwrap();
    let sub = project.path().join("reports").join("2024");
    std::fs::create_dir_all(&sub).unwrap();
    std::fs::write(project.path().join(CONFIG_FILENAME), default_config_content()).unwrap();

    let open_from = |dir: &std::path::Path| {
        let config = load_config_from_path(&find_config_file(dir).unwrap()).unwrap();
        let repo = FileSessionRepository::new(&config.session.path);
        TokenStore::new(Arc::new(repo))
    };

    let root_store = open_from(project.path());
    let context = SessionContext::new(root_store, Arc::new(RecordingNavigator::new()));
    let client = ApiClient::new(&backend.base_url, context).unwrap();
    client.login(STUDENT_EMAIL, PASSWORD).await.unwrap();

    let sub_store = open_from(&sub);
    assert_eq!(sub_store.role(), Some(Role::Student));
    assert_eq!(sub_store.student_id().as_deref(), Some("S001"));
    assert!(project.path().join(".edulog").join("session.json").exists());
    assert!(!sub.join(".edulog").exists());
}
