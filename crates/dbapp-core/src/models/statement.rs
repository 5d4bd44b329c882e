//! Statement Execution API payloads.

use serde::{Deserialize, Serialize};

/// How long the server waits for a result before returning a pending statement
pub const DEFAULT_WAIT_TIMEOUT: &str = "30s";

#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub wait_timeout: String,
}

impl StatementRequest {
    pub fn new(warehouse_id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            warehouse_id: warehouse_id.into(),
            statement: statement.into(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResponse {
    pub statement_id: String,
    pub status: Option<StatementStatus>,
    pub manifest: Option<ResultManifest>,
    pub result: Option<ResultData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementStatus {
    pub state: Option<String>,
    pub error: Option<StatementError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementError {
    pub error_code: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Display for StatementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.error_code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{}: {}", code, message),
            (None, Some(message)) => write!(f, "{}", message),
            (Some(code), None) => write!(f, "{}", code),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultManifest {
    pub schema: Option<ResultSchema>,
    pub total_row_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub type_name: Option<String>,
    pub type_text: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub data_array: Vec<Vec<Option<String>>>,
    pub row_count: Option<i64>,
}

impl StatementResponse {
    pub fn state(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.state.as_deref())
    }

    pub fn succeeded(&self) -> bool {
        self.state() == Some("SUCCEEDED")
    }

    pub fn error(&self) -> Option<&StatementError> {
        self.status.as_ref().and_then(|s| s.error.as_ref())
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        self.manifest
            .as_ref()
            .and_then(|m| m.schema.as_ref())
            .map(|s| s.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        self.result
            .as_ref()
            .map(|r| r.data_array.as_slice())
            .unwrap_or(&[])
    }
}

/// Render one result row, `NULL` standing in for missing values.
pub fn format_row(row: &[Option<String>]) -> String {
    row.iter()
        .map(|v| v.as_deref().unwrap_or("NULL"))
        .collect::<Vec<_>>()
        .join(" | ")
}
