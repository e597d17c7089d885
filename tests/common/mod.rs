#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use kv_shortener::application::services::{ServiceSettings, UrlService};
use kv_shortener::domain::repositories::{KeyTtl, MappingStore, StoreError, StoreResult, Ttl};
use kv_shortener::domain::visit_event::VisitEvent;
use kv_shortener::domain::visit_worker::{VisitWorkerSettings, run_visit_worker};
use kv_shortener::infrastructure::store::MemoryStore;
use kv_shortener::routes::router;
use kv_shortener::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const TEST_HOST: &str = "sho.rt";

/// A running app over an in-memory store with the visit worker attached.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub service: Arc<UrlService>,
}

pub fn create_test_state(
    store: Arc<dyn MappingStore>,
    settings: ServiceSettings,
    base_url: Option<&str>,
) -> (AppState, mpsc::Receiver<VisitEvent>) {
    let service = Arc::new(UrlService::new(store, settings));
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(service, tx, base_url.map(str::to_string));

    (state, rx)
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(ServiceSettings::default(), None)
}

pub fn spawn_app_with(settings: ServiceSettings, base_url: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let (state, rx) = create_test_state(store.clone(), settings, base_url);
    let service = state.url_service.clone();

    tokio::spawn(run_visit_worker(
        rx,
        service.clone(),
        VisitWorkerSettings::default(),
    ));

    let server = TestServer::new(router(state)).unwrap();

    TestApp {
        server,
        store,
        service,
    }
}

/// Creates a link through the API and returns its short code.
pub async fn create_link(server: &TestServer, long_url: &str) -> String {
    let response = server
        .post("/api/v1/shorten")
        .add_header("Host", TEST_HOST)
        .json(&serde_json::json!({ "long_url": long_url }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Polls the info endpoint until `visits` reaches `expected` or a second passes.
pub async fn wait_for_visits(server: &TestServer, code: &str, expected: u64) -> u64 {
    let mut visits = 0;
    for _ in 0..50 {
        let json = server
            .get(&format!("/api/v1/info/{}", code))
            .await
            .json::<serde_json::Value>();
        visits = json["visits"].as_u64().unwrap();
        if visits >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    visits
}

/// Store that fails every operation, as an unreachable Redis would.
pub struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Connection("Connection refused (os error 111)".to_string())
}

#[async_trait]
impl MappingStore for UnreachableStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Ttl) -> StoreResult<()> {
        Err(unreachable())
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Ttl) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(unreachable())
    }

    async fn get_many(&self, _keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        Err(unreachable())
    }

    async fn exists(&self, _key: &str) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn incr(&self, _key: &str) -> StoreResult<i64> {
        Err(unreachable())
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn expire(&self, _key: &str, _ttl: Ttl) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn ttl(&self, _key: &str) -> StoreResult<KeyTtl> {
        Err(unreachable())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(unreachable())
    }
}

pub fn unreachable_server() -> TestServer {
    let (state, _rx) = create_test_state(
        Arc::new(UnreachableStore),
        ServiceSettings::default(),
        None,
    );
    TestServer::new(router(state)).unwrap()
}
