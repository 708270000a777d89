#![allow(dead_code)]

use assert_cmd::Command;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Nothing listens here, so every model call fails fast.
const UNREACHABLE_MODEL_URL: &str = "http://127.0.0.1:9";

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
    model_url: String,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database and no model
    pub fn new() -> Self {
        Self::with_model_url(UNREACHABLE_MODEL_URL)
    }

    /// Create a harness whose model calls go to `model_url`
    pub fn with_model_url(model_url: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self {
            temp_dir,
            db_path,
            model_url: model_url.to_string(),
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tempos").expect("Failed to find tempos binary");

        // Run inside the temp dir so no stray tempos.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("TEMPOS_DATABASE_PATH", &self.db_path);
        cmd.env("TEMPOS_TIMEZONE", "UTC");
        cmd.env("TEMPOS_LLM__BASE_URL", &self.model_url);
        cmd.env("TEMPOS_LLM__TIMEOUT_SECS", "5");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

type Replies = Arc<Mutex<VecDeque<String>>>;

/// A minimal stand-in for Ollama's `/api/chat` that answers with canned replies.
pub struct StubModel {
    base_url: String,
}

impl StubModel {
    pub fn start(replies: &[&str]) -> Self {
        let replies: Replies = Arc::new(Mutex::new(
            replies.iter().map(|r| r.to_string()).collect(),
        ));
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub model");
        listener.set_nonblocking(true).expect("Failed to configure stub listener");
        let addr = listener.local_addr().expect("Stub listener has no address");

        // The server thread lives until the test process exits.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build stub runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("Failed to adopt stub listener");
                let app = Router::new()
                    .route("/api/chat", post(chat))
                    .with_state(replies);
                axum::serve(listener, app).await.expect("Stub model crashed");
            });
        });

        Self { base_url: format!("http://{addr}") }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn chat(State(replies): State<Replies>, Json(_request): Json<Value>) -> Json<Value> {
    let content = replies.lock().unwrap().pop_front().unwrap_or_default();
    Json(json!({
        "model": "stub",
        "message": { "role": "assistant", "content": content },
        "done": true
    }))
}
