//! Data models for app logs and workspace entities.
//!
//! - `LogRecord`, `LogSource`: log lines served by an app's `/logz` endpoints
//! - `UserInfo`: the identity behind a credential
//! - `WarehouseInfo`, `ClusterInfo`: compute resources
//! - `CatalogInfo`, `SchemaInfo`, `TableInfo`: Unity Catalog entities
//! - `StatementRequest`, `StatementResponse`: SQL statement execution
//! - `ServingEndpoint`, `ChatRequest`, `ChatResponse`: model serving
//! - `AppInfo`: a deployed Databricks App

pub mod app;
pub mod catalog;
pub mod cluster;
pub mod log;
pub mod serving;
pub mod statement;
pub mod user;
pub mod warehouse;

pub use app::{AppInfo, AppStatus};
pub use catalog::{
    CatalogInfo, CatalogList, SchemaInfo, SchemaList, TableColumn, TableInfo, TableList,
};
pub use cluster::{ClusterInfo, ClusterList};
pub use log::{LogRecord, LogSource};
pub use serving::{ChatMessage, ChatRequest, ChatResponse, EndpointState, ServingEndpoint, ServingEndpointList};
pub use statement::{format_row, ColumnInfo, StatementRequest, StatementResponse};
pub use user::UserInfo;
pub use warehouse::{WarehouseInfo, WarehouseList};
