//! [`RecordingApi`] fake for dispatch and server tests.
//!
//! Realism level: **FAKE**. No network, every call succeeds or fails the
//! same way.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use github_api::{
    CreateIssue, CreateOrUpdateFile, CreatePullRequest, CreateRepository, ForkRepository,
    GetFileContents, GitHubApi, Result, UpstreamError,
};
use serde_json::{Value, json};
use tokio::sync::Barrier;

/// A call as it reached the upstream boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateRepository(CreateRepository),
    CreateIssue(CreateIssue),
    CreateOrUpdateFile(CreateOrUpdateFile),
    GetFileContents(GetFileContents),
    CreatePullRequest(CreatePullRequest),
    ForkRepository(ForkRepository),
}

impl RecordedCall {
    /// Tool name the call belongs to
    pub fn operation(&self) -> &'static str {
        match self {
            Self::CreateRepository(_) => "create_repository",
            Self::CreateIssue(_) => "create_issue",
            Self::CreateOrUpdateFile(_) => "create_or_update_file",
            Self::GetFileContents(_) => "get_file_contents",
            Self::CreatePullRequest(_) => "create_pull_request",
            Self::ForkRepository(_) => "fork_repository",
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(Value),
    Fail { status: u16, message: String },
}

/// In-memory upstream that records calls.
///
/// # Example
///
/// ```rust,no_run
/// use github_test_utils::RecordingApi;
/// use serde_json::json;
///
/// let api = RecordingApi::responding(json!({"id": 42}));
/// // hand `Arc::new(api)` to a Dispatcher, then inspect `api.calls()`
/// ```
#[derive(Debug)]
pub struct RecordingApi {
    calls: Mutex<Vec<RecordedCall>>,
    reply: Reply,
    gate: Option<Barrier>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingApi {
    /// Answer every call with `{"ok": true}`.
    pub fn new() -> Self {
        Self::responding(json!({"ok": true}))
    }

    /// Answer every call with `body`.
    pub fn responding(body: Value) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Respond(body),
            gate: None,
        }
    }

    /// Fail every call as if GitHub answered with `status`.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Fail {
                status,
                message: message.into(),
            },
            gate: None,
        }
    }

    /// Hold every call until `in_flight` calls are waiting at once.
    ///
    /// A test using this deadlocks if its caller serializes dispatches, so
    /// wrap it in a timeout.
    pub fn gated(mut self, in_flight: usize) -> Self {
        self.gate = Some(Barrier::new(in_flight));
        self
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn record(&self, call: RecordedCall) -> Result<Value> {
        self.lock().push(call);

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        match &self.reply {
            Reply::Respond(body) => Ok(body.clone()),
            Reply::Fail { status, message } => Err(UpstreamError::Status {
                status: *status,
                message: message.clone(),
                body: json!({ "message": message }),
            }),
        }
    }
}

#[async_trait]
impl GitHubApi for RecordingApi {
    async fn create_repository(&self, request: CreateRepository) -> Result<Value> {
        self.record(RecordedCall::CreateRepository(request)).await
    }

    async fn create_issue(&self, request: CreateIssue) -> Result<Value> {
        self.record(RecordedCall::CreateIssue(request)).await
    }

    async fn create_or_update_file(&self, request: CreateOrUpdateFile) -> Result<Value> {
        self.record(RecordedCall::CreateOrUpdateFile(request)).await
    }

    async fn get_file_contents(&self, request: GetFileContents) -> Result<Value> {
        self.record(RecordedCall::GetFileContents(request)).await
    }

    async fn create_pull_request(&self, request: CreatePullRequest) -> Result<Value> {
        self.record(RecordedCall::CreatePullRequest(request)).await
    }

    async fn fork_repository(&self, request: ForkRepository) -> Result<Value> {
        self.record(RecordedCall::ForkRepository(request)).await
    }
}
