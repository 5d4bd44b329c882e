use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An all-purpose or job cluster as returned by `/api/2.0/clusters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: String,
    pub state: Option<String>,
    pub state_message: Option<String>,
    pub driver_node_type_id: Option<String>,
    pub node_type_id: Option<String>,
    pub num_workers: Option<i64>,
    pub spark_version: Option<String>,
    pub creator_user_name: Option<String>,
    /// Epoch milliseconds
    pub start_time: Option<i64>,
    pub terminated_time: Option<i64>,
    pub last_activity_time: Option<i64>,
    pub cluster_memory_mb: Option<i64>,
    pub cluster_cores: Option<f64>,
    pub default_tags: Option<HashMap<String, String>>,
    pub custom_tags: Option<HashMap<String, String>>,
    pub spark_conf: Option<HashMap<String, String>>,
    pub spark_env_vars: Option<HashMap<String, String>>,
    pub autotermination_minutes: Option<i64>,
    pub enable_elastic_disk: Option<bool>,
    pub cluster_source: Option<String>,
    pub policy_id: Option<String>,
}

impl ClusterInfo {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.and_then(DateTime::from_timestamp_millis)
    }

    pub fn terminated_at(&self) -> Option<DateTime<Utc>> {
        self.terminated_time.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterList {
    #[serde(default)]
    pub clusters: Vec<ClusterInfo>,
}
