//! Spreadsheets (Sheets v4).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{endpoint, Workspace};
use crate::api::ApiRequest;
use crate::dryrun::{CreateResource, Intercepted, Mutation, UpdateRange};
use crate::error::ServiceError;
use crate::exec::{Operation, ResourceKind};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    properties: SpreadsheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub spreadsheet_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedRange {
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u64,
    #[serde(default)]
    pub updated_columns: u64,
    #[serde(default)]
    pub updated_cells: u64,
}

pub struct Sheets<'a> {
    ws: &'a Workspace,
}

impl<'a> Sheets<'a> {
    pub(super) fn new(ws: &'a Workspace) -> Self {
        Self { ws }
    }

    fn url(&self, segments: &[&str]) -> Result<String, ServiceError> {
        let mut all = vec!["spreadsheets"];
        all.extend_from_slice(segments);
        endpoint(&self.ws.endpoints().sheets_base_url, &all)
    }

    /// Formatted cell values of `range`; trailing empty cells are omitted by
    /// the API, so rows may be ragged.
    pub async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ServiceError> {
        let request = ApiRequest::get(self.url(&[spreadsheet_id, "values", range])?);
        let body: ValueRange = self
            .ws
            .call(Operation::read("sheets.values.get", ResourceKind::Range), request)
            .await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    pub async fn spreadsheet_title(&self, spreadsheet_id: &str) -> Result<String, ServiceError> {
        let request =
            ApiRequest::get(self.url(&[spreadsheet_id])?).query("fields", "properties.title");
        let meta: SpreadsheetMeta = self
            .ws
            .call(
                Operation::read("sheets.spreadsheets.get", ResourceKind::Spreadsheet),
                request,
            )
            .await?;
        Ok(meta.properties.title)
    }

    pub async fn create_spreadsheet(
        &self,
        title: &str,
        simulate: bool,
    ) -> Result<Intercepted<CreatedSpreadsheet>, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::InvalidArguments(
                "spreadsheet title must not be empty".to_string(),
            ));
        }
        let mutation = Mutation::from(CreateResource {
            resource: ResourceKind::Spreadsheet,
            name: title.to_string(),
            parent_id: None,
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || async {
                let request = ApiRequest::post(self.url(&[])?)
                    .json(json!({ "properties": { "title": title } }));
                self.ws
                    .call(
                        Operation::write("sheets.spreadsheets.create", ResourceKind::Spreadsheet),
                        request,
                    )
                    .await
            })
            .await
    }

    /// Overwrite `range` with `values`, parsed as if typed by a user.
    pub async fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        simulate: bool,
    ) -> Result<Intercepted<UpdatedRange>, ServiceError> {
        if values.is_empty() {
            return Err(ServiceError::InvalidArguments(
                "no values to write".to_string(),
            ));
        }
        let payload = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": &values,
        });
        let mutation = Mutation::from(UpdateRange {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values,
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || async {
                let request = ApiRequest::put(self.url(&[spreadsheet_id, "values", range])?)
                    .query("valueInputOption", "USER_ENTERED")
                    .json(payload);
                self.ws
                    .call(
                        Operation::write("sheets.values.update", ResourceKind::Range),
                        request,
                    )
                    .await
            })
            .await
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
