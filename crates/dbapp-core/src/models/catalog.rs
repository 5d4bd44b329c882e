use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Unity Catalog catalog as returned by `/api/2.1/unity-catalog/catalogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    pub full_name: Option<String>,
    pub comment: Option<String>,
    pub owner: Option<String>,
    pub catalog_type: Option<String>,
    pub storage_root: Option<String>,
    pub metastore_id: Option<String>,
    /// Epoch milliseconds
    pub created_at: Option<i64>,
    pub created_by: Option<String>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogList {
    #[serde(default)]
    pub catalogs: Vec<CatalogInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    pub catalog_name: Option<String>,
    pub full_name: Option<String>,
    pub comment: Option<String>,
    pub owner: Option<String>,
    pub storage_root: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaList {
    #[serde(default)]
    pub schemas: Vec<SchemaInfo>,
}

/// A table or view. Listing calls may omit `columns`; `get` fills them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
    pub full_name: Option<String>,
    pub table_type: Option<String>,
    pub data_source_format: Option<String>,
    pub storage_location: Option<String>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub created_at: Option<i64>,
    pub created_by: Option<String>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<String>,
    pub view_definition: Option<String>,
    pub table_id: Option<String>,
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    pub properties: Option<HashMap<String, String>>,
}

impl TableInfo {
    pub fn table_type_display(&self) -> &str {
        self.table_type.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .or(self.created_at)
            .and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub type_text: Option<String>,
    pub type_name: Option<String>,
    pub position: Option<i64>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl TableColumn {
    /// `type_text` is the SQL spelling (`decimal(10,2)`); `type_name` the bare kind.
    pub fn type_display(&self) -> &str {
        self.type_text
            .as_deref()
            .or(self.type_name.as_deref())
            .unwrap_or("UNKNOWN")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableList {
    #[serde(default)]
    pub tables: Vec<TableInfo>,
}
