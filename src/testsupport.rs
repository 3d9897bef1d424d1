//! Shared test fixtures: temp dirs, a scripted transport, and an in-memory
//! preview lookup.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::{ApiRequest, Transport};
use crate::auth::{Bearer, StaticToken};
use crate::config::ServicesConfig;
use crate::dryrun::PreviewLookup;
use crate::error::{ApiError, ExecError, ServiceError};
use crate::exec::{BackoffPolicy, RetryExecutor, RetryPolicy};
use crate::services::{RemoteFile, Workspace, FOLDER_MIME_TYPE};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("steward-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Remote file metadata with a plain-text MIME type.
pub fn remote_file(
    id: &str,
    name: &str,
    size: Option<u64>,
    modified_time: Option<DateTime<Utc>>,
) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "text/plain".to_string(),
        size,
        modified_time,
        parents: Vec::new(),
    }
}

enum Scripted {
    Json(Value),
    Status(u16, Option<Duration>),
}

#[derive(Default)]
struct MockState {
    script: VecDeque<Scripted>,
    requests: Vec<ApiRequest>,
}

/// Transport that replays scripted responses in order and records requests.
///
/// Clones share state, so a test can keep one handle while the workspace
/// owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, value: Value) -> Self {
        self.push(Scripted::Json(value));
        self
    }

    pub fn respond_status(self, code: u16, retry_after: Option<Duration>) -> Self {
        self.push(Scripted::Status(code, retry_after));
        self
    }

    fn push(&self, item: Scripted) {
        self.state.lock().unwrap().script.push_back(item);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn mutating_requests(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.is_mutating())
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest, _bearer: &Bearer) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        match state.script.pop_front() {
            Some(Scripted::Json(value)) => Ok(value),
            Some(Scripted::Status(code, retry_after)) => {
                Err(ApiError::status(code, "scripted failure", retry_after))
            }
            None => Err(ApiError::InvalidResponse(format!(
                "no scripted response for {} {}",
                request.method, request.url
            ))),
        }
    }
}

pub fn test_endpoints() -> ServicesConfig {
    ServicesConfig {
        drive_base_url: "https://drive.test/drive/v3".to_string(),
        drive_upload_url: "https://drive.test/upload/drive/v3".to_string(),
        sheets_base_url: "https://sheets.test/v4".to_string(),
        mail_base_url: "https://mail.test/gmail/v1".to_string(),
    }
}

/// Workspace over `mock` with default ceilings and millisecond backoff.
pub fn workspace_with(mock: &MockTransport) -> Workspace {
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(5), 0.0),
        Arc::new(StaticToken::new("test-token")),
    );
    Workspace::new(Arc::new(mock.clone()), executor, test_endpoints())
}

/// In-memory drive tree implementing the preview lookup.
#[derive(Default)]
pub struct FakeDrive {
    files: HashMap<String, RemoteFile>,
    titles: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(self, id: &str, name: &str, parent: Option<&str>) -> Self {
        self.insert(id, name, parent, FOLDER_MIME_TYPE, None)
    }

    pub fn file(self, id: &str, name: &str, parent: Option<&str>, size: u64) -> Self {
        self.insert(id, name, parent, "text/plain", Some(size))
    }

    pub fn spreadsheet(mut self, id: &str, title: &str) -> Self {
        self.titles.insert(id.to_string(), title.to_string());
        self
    }

    fn insert(
        mut self,
        id: &str,
        name: &str,
        parent: Option<&str>,
        mime_type: &str,
        size: Option<u64>,
    ) -> Self {
        let mut file = remote_file(id, name, size, None);
        file.mime_type = mime_type.to_string();
        file.parents = parent.map(|p| vec![p.to_string()]).unwrap_or_default();
        self.files.insert(id.to_string(), file);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn not_found(operation: &'static str) -> ServiceError {
        ServiceError::Exec(ExecError::Permanent {
            operation,
            attempts: 1,
            source: ApiError::status(404, "not found", None),
        })
    }
}

#[async_trait]
impl PreviewLookup for FakeDrive {
    async fn file_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found("drive.files.get"))
    }

    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ServiceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut children: Vec<RemoteFile> = self
            .files
            .values()
            .filter(|f| f.parents.iter().any(|p| p == folder_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn spreadsheet_title(&self, spreadsheet_id: &str) -> Result<String, ServiceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.titles
            .get(spreadsheet_id)
            .cloned()
            .ok_or_else(|| Self::not_found("sheets.spreadsheets.get"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[tokio::test]
    async fn mock_transport_replays_in_order() {
        let mock = MockTransport::new()
            .respond_status(429, Some(Duration::from_secs(1)))
            .respond_json(serde_json::json!({"ok": true}));
        let bearer = Bearer::new("t");
        let first = mock.send(&ApiRequest::get("https://x/a"), &bearer).await;
        assert_eq!(first.unwrap_err().retry_after(), Some(Duration::from_secs(1)));
        let second = mock.send(&ApiRequest::post("https://x/b"), &bearer).await;
        assert_eq!(second.unwrap()["ok"], true);
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.mutating_requests(), 1);
    }
}
