//! Integration tests for the RTI backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Autosave quiet period used by the fixtures; long enough that consecutive
/// requests land well inside it, short enough to keep the tests fast.
const QUIET_MS: u64 = 300;

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let state_dir = temp_dir.path().join("state");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        // Create config
        let config = Config {
            db_path,
            state_dir,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            autosave_quiet_period: Duration::from_millis(QUIET_MS),
            lookup_cache_ttl: Duration::from_secs(60),
            lookup_cache_capacity: 64,
            default_language: "en".to_string(),
        };

        let state = AppState::new(repo, Arc::new(config));
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Self::client_for("client-main"),
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn client_for(client_id: &str) -> Client {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-client-id", client_id.parse().unwrap());
        Client::builder().default_headers(headers).build().unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn application_count(&self) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await
            .unwrap();
        row.0
    }

    /// Sleep past the quiet period so a scheduled autosave has fired.
    async fn wait_for_autosave(&self) {
        tokio::time::sleep(Duration::from_millis(QUIET_MS * 4)).await;
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_missing_client_id_rejected() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_draft_updates_merge_across_requests() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({ "query": "pending RFPs 2023" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "department": "Ministry of Finance",
            "applicant": { "name": "A. Citizen", "address": "12 Main St" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["query"], "pending RFPs 2023");
    assert_eq!(body["data"]["department"], "Ministry of Finance");
    assert_eq!(body["data"]["applicant"]["name"], "A. Citizen");
    assert_eq!(body["data"]["language"], "en");
}

#[tokio::test]
async fn test_autosave_creates_once_then_updates() {
    let fixture = TestFixture::new().await;

    // First edit: after the quiet period, exactly one create.
    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "pending RFPs 2023",
            "department": "Ministry of Finance"
        }))
        .send()
        .await
        .unwrap();
    fixture.wait_for_autosave().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().expect("identity after autosave");

    assert_eq!(fixture.application_count().await, 1);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/applications/{}", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["query"], "pending RFPs 2023");
    assert_eq!(body["data"]["departmentId"], "dept-finance");
    assert!(body["data"]["ownerId"]
        .as_str()
        .unwrap()
        .starts_with("guest:"));

    // Second edit: an update keyed by the same identity, no second create.
    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({ "query": "pending RFPs 2023 and 2024" }))
        .send()
        .await
        .unwrap();
    fixture.wait_for_autosave().await;

    assert_eq!(fixture.application_count().await, 1);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/applications/{}", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["query"], "pending RFPs 2023 and 2024");
}

#[tokio::test]
async fn test_clear_resets_identity_and_next_save_creates() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "pending RFPs 2023",
            "department": "Ministry of Finance"
        }))
        .send()
        .await
        .unwrap();
    fixture.wait_for_autosave().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let first_id = body["data"]["id"].as_str().unwrap().to_string();

    // Clear, then edit again: a fresh record, never an update of the old one.
    let resp = fixture
        .client
        .delete(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["id"].is_null());
    assert_eq!(body["data"]["query"], "");

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "school budgets",
            "department": "Ministry of Education"
        }))
        .send()
        .await
        .unwrap();
    fixture.wait_for_autosave().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/draft"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let second_id = body["data"]["id"].as_str().unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(fixture.application_count().await, 2);
}

#[tokio::test]
async fn test_blank_query_triggers_no_remote_write() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({ "query": "   ", "department": "Ministry of Finance" }))
        .send()
        .await
        .unwrap();
    fixture.wait_for_autosave().await;

    assert_eq!(fixture.application_count().await, 0);
}

#[tokio::test]
async fn test_save_now_bypasses_debounce() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "pending RFPs 2023",
            "department": "Ministry of Finance"
        }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/draft/save"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "created");
    assert!(body["data"]["draft"]["id"].is_string());
    assert_eq!(fixture.application_count().await, 1);

    // The pending timer was cancelled; no duplicate create follows.
    fixture.wait_for_autosave().await;
    assert_eq!(fixture.application_count().await, 1);
}

#[tokio::test]
async fn test_save_now_with_blank_query_is_skipped() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/draft/save"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "skipped");
    assert_eq!(fixture.application_count().await, 0);
}

#[tokio::test]
async fn test_load_unknown_identity_is_distinct_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/draft/load/no-such-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_loaded_draft_routes_edits_through_update() {
    let fixture = TestFixture::new().await;

    // Client A creates a draft.
    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "water quality reports",
            "department": "Ministry of Environment",
            "subject": "River monitoring"
        }))
        .send()
        .await
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/draft/save"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["draft"]["id"].as_str().unwrap().to_string();

    // Client B resumes from the shared identity.
    let other = TestFixture::client_for("client-other");
    let resp = other
        .post(fixture.url(&format!("/api/draft/load/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["query"], "water quality reports");
    assert_eq!(body["data"]["subject"], "River monitoring");

    // Client B's edit updates the same record instead of creating one.
    other
        .put(fixture.url("/api/draft"))
        .json(&json!({ "query": "water quality reports 2020-2023" }))
        .send()
        .await
        .unwrap();
    other
        .post(fixture.url("/api/draft/save"))
        .send()
        .await
        .unwrap();

    assert_eq!(fixture.application_count().await, 1);
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/applications/{}", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["query"], "water quality reports 2020-2023");
}

#[tokio::test]
async fn test_department_lookup() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/departments/lookup?name=Ministry%20of%20Finance"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "dept-finance");

    // Unknown names resolve to null, not an error.
    let resp = fixture
        .client
        .get(fixture.url("/api/departments/lookup?name=Ministry%20of%20Silly%20Walks"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["id"].is_null());
}

#[tokio::test]
async fn test_departments_and_templates_are_seeded() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/departments"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().len() >= 5);

    let resp = fixture
        .client
        .get(fixture.url("/api/templates"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_generate_letter_applies_subject_default() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({
            "query": "pending RFPs 2023",
            "department": "Ministry of Finance"
        }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/draft/generate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let formatted = body["data"]["formatted"].as_str().unwrap();
    assert!(formatted.contains("Ministry of Finance"));
    assert!(body["data"]["structured"]["subject"]
        .as_str()
        .unwrap()
        .starts_with("Request for information:"));
}

#[tokio::test]
async fn test_generate_letter_requires_department() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .put(fixture.url("/api/draft"))
        .json(&json!({ "query": "pending RFPs 2023" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/draft/generate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
