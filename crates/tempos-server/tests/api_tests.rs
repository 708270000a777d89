//! Integration tests for the API server
//!
//! Each test binds a real listener on an ephemeral port, serves the router
//! over a temporary database and a scripted model, and talks to it with reqwest.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;
use tempos_core::llm::{ChatMessage, LanguageModel, LlmError};
use tempos_core::repository::SqliteRepository;
use tempos_core::service::ScheduleService;
use tempos_core::timezone::TimestampNormalizer;
use tempos_server::AppState;

/// Replays canned replies; an exhausted script behaves like a model that is down.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Status { status: 503, body: "model unavailable".to_string() })
    }
}

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    _temp_dir: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(replies: &[&str]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let repo = SqliteRepository::open(&db_path.to_string_lossy())
            .await
            .expect("Failed to open test database");

        let model = ScriptedModel {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        };
        let normalizer = TimestampNormalizer::from_name("UTC").unwrap();
        let service = ScheduleService::new(repo, std::sync::Arc::new(model), normalizer, 30);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            tempos_server::serve(listener, AppState::new(service))
                .await
                .expect("Failed to serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _temp_dir: temp_dir,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start(&[]).await;

    let (status, json) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_parse_creates_schedule() {
    let server = TestServer::start(&[
        r#"{"title": "Submit scholarship application", "details": "", "start": "2025-09-10T09:00:00Z", "end": null, "location": "", "tags": ["deadline"]}"#,
    ])
    .await;

    let (status, json) = server
        .post("/api/v1/tasks/parse", json!({"text": "Submit scholarship application by Sept 10"}))
        .await;
    assert_eq!(status, 201);
    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Submit scholarship application");
    assert_eq!(json["start"], "2025-09-10T09:00:00Z");
    assert_eq!(json["tags"], json!(["deadline"]));
}

#[tokio::test]
async fn test_parse_failure_is_unprocessable() {
    let server = TestServer::start(&["nope", "still nope"]).await;

    let (status, json) = server.post("/api/v1/tasks/parse", json!({"text": "???"})).await;
    assert_eq!(status, 422);
    assert!(json["error"].as_str().unwrap().contains("Could not extract"));
}

#[tokio::test]
async fn test_unreadable_requests_get_json_errors() {
    let server = TestServer::start(&[]).await;

    let (status, json) = server.post("/api/v1/tasks/parse", json!({})).await;
    assert_eq!(status, 422);
    assert!(json["error"].as_str().unwrap().contains("text"));

    let response = server
        .client
        .post(server.url("/api/v1/query"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"].is_string());

    let (status, json) = server.get("/api/v1/upcoming?days=soon").await;
    assert_eq!(status, 400);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_model_down_is_bad_gateway() {
    let server = TestServer::start(&[]).await;

    let (status, json) = server.post("/api/v1/query", json!({"question": "anything?"})).await;
    assert_eq!(status, 502);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_create_list_and_purge() {
    let server = TestServer::start(&[]).await;

    let (status, created) = server
        .post(
            "/api/v1/tasks",
            json!({
                "title": "Dentist",
                "start_ts": "2030-01-15T14:00:00Z",
                "location": "Maarif",
                "tags": ["health, personal"]
            }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(created["tags"], json!(["health", "personal"]));
    assert_eq!(created["details"], "");

    let (status, _) = server.post("/api/v1/tasks", json!({"title": "  "})).await;
    assert_eq!(status, 400);

    let (status, listed) = server.get("/api/v1/tasks?limit=10").await;
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Dentist");

    let response = server.client.delete(server.url("/api/v1/tasks")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let purged: Value = response.json().await.unwrap();
    assert_eq!(purged["deleted"], 1);

    let (_, listed) = server.get("/api/v1/tasks").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_query_with_summary() {
    let server = TestServer::start(&[
        "```sql\nSELECT title, tags FROM schedules WHERE tags LIKE '%health%'\n```",
        "- One health appointment",
    ])
    .await;
    server
        .post("/api/v1/tasks", json!({"title": "Dentist", "tags": ["health"]}))
        .await;

    let (status, json) = server
        .post("/api/v1/query", json!({"question": "health stuff?", "summarize": true}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["fallback_used"], false);
    assert!(json["sql"].as_str().unwrap().ends_with("ORDER BY start_ts IS NULL, start_ts, id;"));
    assert_eq!(json["rows"][0]["title"], "Dentist");
    assert_eq!(json["summary"], "- One health appointment");
}

#[tokio::test]
async fn test_injection_uses_fallback() {
    let server = TestServer::start(&["SELECT 1; DROP TABLE schedules;"]).await;
    server
        .post("/api/v1/tasks", json!({"title": "Kept", "start": "2000-01-01T00:00:00Z"}))
        .await;

    let (status, json) = server
        .post("/api/v1/query", json!({"question": "\"; DROP TABLE schedules;"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["fallback_used"], true);
    assert!(json.get("summary").is_none());

    let (_, listed) = server.get("/api/v1/tasks").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upcoming_validates_window() {
    let server = TestServer::start(&[]).await;

    let (status, json) = server.get("/api/v1/upcoming?days=7").await;
    assert_eq!(status, 200);
    assert!(json["sql"].as_str().unwrap().contains("+7 days"));
    assert!(json["rows"].as_array().unwrap().is_empty());

    let (status, json) = server.get("/api/v1/upcoming?days=365").await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("days"));
}

#[tokio::test]
async fn test_admin_sql() {
    let server = TestServer::start(&[]).await;
    server.post("/api/v1/tasks", json!({"title": "One"})).await;

    let (status, json) = server
        .post("/api/v1/admin/sql", json!({"sql": "SELECT COUNT(*) AS n FROM schedules"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["rows"][0]["n"], 1);

    let (status, json) = server
        .post("/api/v1/admin/sql", json!({"sql": "DELETE FROM schedules"}))
        .await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("rejected"));

    let (status, json) = server
        .post("/api/v1/admin/sql", json!({"sql": "SELECT nope FROM nowhere"}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["sql"], "SELECT nope FROM nowhere");
}
