//! File storage (Drive v3).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{endpoint, Workspace};
use crate::api::ApiRequest;
use crate::dryrun::{
    plan_sync, scan_local_dir, CreateResource, DeleteResource, Intercepted, LocalFile, Mutation,
    SyncAction, SyncDecision, SyncFolder, SyncTotals, ROOT_FOLDER_ID,
};
use crate::error::ServiceError;
use crate::exec::{Operation, ResourceKind};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,parents";
const PAGE_SIZE: &str = "1000";
const MULTIPART_BOUNDARY: &str = "steward-upload-boundary";

/// File metadata as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    /// Byte size; absent for native documents and folders.
    #[serde(default, deserialize_with = "size_from_string")]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Sizes arrive as decimal strings (`"1024"`).
fn size_from_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
    next_page_token: Option<String>,
}

/// Result of a real folder sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub entries: Vec<SyncDecision>,
    pub totals: SyncTotals,
}

pub struct Drive<'a> {
    ws: &'a Workspace,
}

impl<'a> Drive<'a> {
    pub(super) fn new(ws: &'a Workspace) -> Self {
        Self { ws }
    }

    fn files_url(&self, segments: &[&str]) -> Result<String, ServiceError> {
        let mut all = vec!["files"];
        all.extend_from_slice(segments);
        endpoint(&self.ws.endpoints().drive_base_url, &all)
    }

    pub async fn get_file(&self, id: &str) -> Result<RemoteFile, ServiceError> {
        let request = ApiRequest::get(self.files_url(&[id])?).query("fields", FILE_FIELDS);
        self.ws
            .call(Operation::read("drive.files.get", ResourceKind::File), request)
            .await
    }

    /// All non-trashed children of `folder_id`, following page tokens.
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ServiceError> {
        let url = self.files_url(&[])?;
        let query = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = ApiRequest::get(url.clone())
                .query("q", query.clone())
                .query("fields", format!("nextPageToken,files({FILE_FIELDS})"))
                .query("pageSize", PAGE_SIZE)
                .query("orderBy", "name");
            if let Some(token) = &page_token {
                request = request.query("pageToken", token.clone());
            }
            let page: FileList = self
                .ws
                .call(Operation::read("drive.files.list", ResourceKind::Folder), request)
                .await?;
            files.extend(page.files);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(files)
    }

    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        simulate: bool,
    ) -> Result<Intercepted<RemoteFile>, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidArguments(
                "folder name must not be empty".to_string(),
            ));
        }
        let mutation = Mutation::from(CreateResource {
            resource: ResourceKind::Folder,
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || async {
                let request = ApiRequest::post(self.files_url(&[])?)
                    .query("fields", FILE_FIELDS)
                    .json(json!({
                        "name": name,
                        "mimeType": FOLDER_MIME_TYPE,
                        "parents": [parent_id.unwrap_or(ROOT_FOLDER_ID)],
                    }));
                self.ws
                    .call(
                        Operation::write("drive.files.create", ResourceKind::Folder),
                        request,
                    )
                    .await
            })
            .await
    }

    pub async fn delete_file(
        &self,
        id: &str,
        simulate: bool,
    ) -> Result<Intercepted<()>, ServiceError> {
        let mutation = Mutation::from(DeleteResource {
            resource: ResourceKind::File,
            id: id.to_string(),
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || async {
                let request = ApiRequest::delete(self.files_url(&[id])?);
                let _: Value = self
                    .ws
                    .call(
                        Operation::write("drive.files.delete", ResourceKind::File),
                        request,
                    )
                    .await?;
                Ok(())
            })
            .await
    }

    /// Upload new and changed top-level files of `local_dir` into `folder_id`.
    ///
    /// Every upload is its own write; a failure stops the sync and earlier
    /// uploads stay in place.
    pub async fn sync_folder(
        &self,
        local_dir: &Path,
        folder_id: &str,
        simulate: bool,
    ) -> Result<Intercepted<SyncOutcome>, ServiceError> {
        let mutation = Mutation::from(SyncFolder {
            local_dir: local_dir.to_path_buf(),
            folder_id: folder_id.to_string(),
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || self.run_sync(local_dir, folder_id))
            .await
    }

    async fn run_sync(&self, local_dir: &Path, folder_id: &str) -> Result<SyncOutcome, ServiceError> {
        let local = scan_local_dir(local_dir)?;
        let remote = self.list_folder(folder_id).await?;
        let entries = plan_sync(&local, &remote);
        for decision in &entries {
            let Some(file) = local.iter().find(|f| f.name == decision.name) else {
                continue;
            };
            match (decision.action, decision.remote_id.as_deref()) {
                (SyncAction::Create, _) => self.upload_new(file, folder_id).await?,
                (SyncAction::Update, Some(remote_id)) => {
                    self.upload_revision(file, remote_id).await?
                }
                _ => continue,
            }
            info!(file = %decision.name, action = ?decision.action, "synced");
        }
        Ok(SyncOutcome {
            totals: SyncTotals::tally(&entries),
            entries,
        })
    }

    async fn upload_new(&self, file: &LocalFile, folder_id: &str) -> Result<(), ServiceError> {
        let metadata = json!({
            "name": file.name,
            "parents": [folder_id],
            "modifiedTime": file.modified,
        });
        let request = ApiRequest::post(self.upload_url(&[])?);
        let request = self.with_multipart(request, &metadata, file).await?;
        let _: RemoteFile = self
            .ws
            .call(Operation::write("drive.files.create", ResourceKind::File), request)
            .await?;
        Ok(())
    }

    async fn upload_revision(&self, file: &LocalFile, remote_id: &str) -> Result<(), ServiceError> {
        let metadata = json!({ "modifiedTime": file.modified });
        let request = ApiRequest::patch(self.upload_url(&[remote_id])?);
        let request = self.with_multipart(request, &metadata, file).await?;
        let _: RemoteFile = self
            .ws
            .call(Operation::write("drive.files.update", ResourceKind::File), request)
            .await?;
        Ok(())
    }

    fn upload_url(&self, segments: &[&str]) -> Result<String, ServiceError> {
        let mut all = vec!["files"];
        all.extend_from_slice(segments);
        endpoint(&self.ws.endpoints().drive_upload_url, &all)
    }

    async fn with_multipart(
        &self,
        request: ApiRequest,
        metadata: &Value,
        file: &LocalFile,
    ) -> Result<ApiRequest, ServiceError> {
        let content = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ServiceError::local(&file.path, e))?;
        Ok(request
            .query("uploadType", "multipart")
            .query("fields", FILE_FIELDS)
            .bytes(
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
                multipart_related(metadata, &content),
            ))
    }
}

/// `multipart/related` body: JSON metadata part, then the raw content.
fn multipart_related(metadata: &Value, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{MULTIPART_BOUNDARY}\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn escape_query(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dryrun::{DryRunReport, SyncReason};
    use crate::testsupport::{workspace_with, MockTransport, TestTempDir};
    use chrono::TimeZone;
    use reqwest::Method;

    fn file_json(id: &str, name: &str, size: u64, modified: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "mimeType": "text/plain",
            "size": size.to_string(),
            "modifiedTime": modified,
            "parents": ["folder"],
        })
    }

    #[test]
    fn remote_file_parses_string_sizes() {
        let file: RemoteFile =
            serde_json::from_value(file_json("a", "a.txt", 12, "2026-01-02T03:04:05.678Z")).unwrap();
        assert_eq!(file.size, Some(12));
        assert_eq!(
            file.modified_time,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(678))
        );
        let folder: RemoteFile = serde_json::from_value(json!({
            "id": "d", "name": "docs", "mimeType": FOLDER_MIME_TYPE
        }))
        .unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.size, None);
    }

    #[test]
    fn query_quotes_are_escaped() {
        assert_eq!(escape_query("it's"), "it\\'s");
    }

    #[test]
    fn multipart_body_wraps_metadata_and_content() {
        let body = multipart_related(&json!({"name": "a"}), b"hello");
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with(&format!("--{MULTIPART_BOUNDARY}\r\n")));
        assert!(text.contains("{\"name\":\"a\"}"));
        assert!(text.contains("\r\n\r\nhello\r\n"));
        assert!(text.ends_with(&format!("--{MULTIPART_BOUNDARY}--\r\n")));
    }

    #[tokio::test]
    async fn list_folder_follows_page_tokens() {
        let mock = MockTransport::new()
            .respond_json(json!({"files": [file_json("1", "a", 1, "2026-01-01T00:00:00Z")], "nextPageToken": "p2"}))
            .respond_json(json!({"files": [file_json("2", "b", 1, "2026-01-01T00:00:00Z")]}));
        let ws = workspace_with(&mock);
        let files = ws.drive().list_folder("folder").await.unwrap();
        assert_eq!(files.len(), 2);
        let requests = mock.requests();
        assert!(requests[1]
            .query
            .contains(&("pageToken".to_string(), "p2".to_string())));
    }

    #[tokio::test]
    async fn simulated_delete_issues_no_writes() {
        let mock = MockTransport::new().respond_json(file_json("f1", "old.txt", 3, "2026-01-01T00:00:00Z"));
        let ws = workspace_with(&mock);
        let out = ws.drive().delete_file("f1", true).await.unwrap();
        assert_eq!(mock.mutating_requests(), 0);
        assert_eq!(
            out,
            Intercepted::Simulated(DryRunReport::DeleteResource {
                id: "f1".into(),
                name: "old.txt".into(),
                resource: ResourceKind::File,
            })
        );
    }

    #[tokio::test]
    async fn real_delete_sends_one_delete() {
        let mock = MockTransport::new().respond_json(Value::Null);
        let ws = workspace_with(&mock);
        let out = ws.drive().delete_file("f1", false).await.unwrap();
        assert_eq!(out, Intercepted::Executed(()));
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::DELETE);
        assert!(requests[0].url.ends_with("/files/f1"));
    }

    #[tokio::test]
    async fn create_folder_defaults_to_root_parent() {
        let mock = MockTransport::new().respond_json(json!({
            "id": "new", "name": "Drafts", "mimeType": FOLDER_MIME_TYPE, "parents": ["root"]
        }));
        let ws = workspace_with(&mock);
        let created = ws
            .drive()
            .create_folder("Drafts", None, false)
            .await
            .unwrap()
            .executed()
            .unwrap();
        assert_eq!(created.id, "new");
        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::POST);
        let crate::api::RequestBody::Json(body) = &requests[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["parents"], json!(["root"]));
    }

    #[tokio::test]
    async fn empty_folder_name_is_rejected_before_any_call() {
        let mock = MockTransport::new();
        let ws = workspace_with(&mock);
        let err = ws.drive().create_folder(" ", None, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArguments(_)));
        assert!(mock.requests().is_empty());
    }

    fn sync_fixture() -> (TestTempDir, MockTransport) {
        let tmp = TestTempDir::new("drive-sync");
        tmp.write_text("new.txt", "fresh");
        tmp.write_text("same.txt", "12345");
        tmp.write_text("changed.txt", "longer now");
        // Remote timestamps far in the future keep same-size files unchanged.
        let listing = json!({"files": [
            file_json("r-same", "same.txt", 5, "2100-01-01T00:00:00Z"),
            file_json("r-changed", "changed.txt", 3, "2100-01-01T00:00:00Z"),
        ]});
        let mock = MockTransport::new()
            .respond_json(json!({"id": "folder", "name": "Backup", "mimeType": FOLDER_MIME_TYPE}))
            .respond_json(listing);
        (tmp, mock)
    }

    #[tokio::test]
    async fn simulated_sync_reports_three_decisions_without_writes() {
        let (tmp, mock) = sync_fixture();
        let ws = workspace_with(&mock);
        let out = ws.drive().sync_folder(tmp.path(), "folder", true).await.unwrap();
        let Some(DryRunReport::SyncFolder {
            entries,
            totals,
            folder_name,
            ..
        }) = out.report().cloned()
        else {
            panic!("expected sync report, got {out:?}");
        };
        assert_eq!(mock.mutating_requests(), 0);
        assert_eq!(folder_name, "Backup");
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.action))
            .collect();
        assert_eq!(
            summary,
            [
                ("changed.txt", SyncAction::Update),
                ("new.txt", SyncAction::Create),
                ("same.txt", SyncAction::Skip),
            ]
        );
        assert_eq!(
            entries[0].reason,
            SyncReason::SizeChanged {
                local_size: 10,
                remote_size: Some(3)
            }
        );
        assert_eq!(entries[1].reason, SyncReason::NotInRemote);
        assert_eq!(entries[2].reason, SyncReason::Unchanged);
        assert_eq!((totals.create, totals.update, totals.skip), (1, 1, 1));
    }

    #[tokio::test]
    async fn repeated_simulation_yields_identical_reports() {
        let (tmp, _) = sync_fixture();
        let folder = json!({"id": "folder", "name": "Backup", "mimeType": FOLDER_MIME_TYPE});
        let listing = json!({"files": [
            file_json("r-same", "same.txt", 5, "2100-01-01T00:00:00Z"),
        ]});
        let mock = MockTransport::new()
            .respond_json(folder.clone())
            .respond_json(listing.clone())
            .respond_json(folder)
            .respond_json(listing);
        let ws = workspace_with(&mock);
        let first = ws.drive().sync_folder(tmp.path(), "folder", true).await.unwrap();
        let second = ws.drive().sync_folder(tmp.path(), "folder", true).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.report()).unwrap(),
            serde_json::to_string(&second.report()).unwrap()
        );
        assert_eq!(mock.mutating_requests(), 0);
    }

    #[tokio::test]
    async fn real_sync_uploads_only_planned_files() {
        let (tmp, _) = sync_fixture();
        let listing = json!({"files": [
            file_json("r-same", "same.txt", 5, "2100-01-01T00:00:00Z"),
            file_json("r-changed", "changed.txt", 3, "2100-01-01T00:00:00Z"),
        ]});
        let mock = MockTransport::new()
            .respond_json(listing)
            .respond_json(file_json("r-changed", "changed.txt", 10, "2026-01-01T00:00:00Z"))
            .respond_json(file_json("r-new", "new.txt", 5, "2026-01-01T00:00:00Z"));
        let ws = workspace_with(&mock);
        let outcome = ws
            .drive()
            .sync_folder(tmp.path(), "folder", false)
            .await
            .unwrap()
            .executed()
            .unwrap();
        assert_eq!(outcome.totals.skip, 1);

        let writes: Vec<_> = mock
            .requests()
            .into_iter()
            .filter(|r| r.is_mutating())
            .collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].method, Method::PATCH);
        assert!(writes[0].url.contains("/upload/"));
        assert!(writes[0].url.ends_with("/files/r-changed"));
        assert_eq!(writes[1].method, Method::POST);
    }
}
