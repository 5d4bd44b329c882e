use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A SQL warehouse as returned by `/api/2.0/sql/warehouses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseInfo {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub cluster_size: Option<String>,
    pub min_num_clusters: Option<i64>,
    pub max_num_clusters: Option<i64>,
    pub auto_stop_mins: Option<i64>,
    pub creator_name: Option<String>,
    pub jdbc_url: Option<String>,
    pub odbc_params: Option<Value>,
    pub tags: Option<Value>,
    pub spot_instance_policy: Option<String>,
    pub enable_photon: Option<bool>,
    pub enable_serverless_compute: Option<bool>,
    pub warehouse_type: Option<String>,
    pub num_clusters: Option<i64>,
    pub num_active_sessions: Option<i64>,
}

impl WarehouseInfo {
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("RUNNING")
    }

    pub fn state_display(&self) -> &str {
        self.state.as_deref().unwrap_or("UNKNOWN")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseList {
    #[serde(default)]
    pub warehouses: Vec<WarehouseInfo>,
}
