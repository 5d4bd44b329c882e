use serde::{Deserialize, Serialize};

/// A deployed Databricks App, as reported by `databricks apps get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub app_status: Option<AppStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStatus {
    pub state: Option<String>,
    pub message: Option<String>,
}
