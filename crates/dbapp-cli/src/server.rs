//! Web API passing workspace data through to the browser.
//!
//! - `GET /health`: liveness
//! - `GET /api/user/me`: the identity behind the server's credential
//! - `GET /api/warehouses`: SQL warehouses visible to that identity
//! - `GET /api/clusters`, `GET /api/clusters/:cluster_id`: clusters
//! - `GET /api/catalogs`, `.../:catalog/schemas`, `.../:schema/tables`: Unity Catalog
//! - `GET /api/tables/:full_name`: one table with its columns

use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dbapp_core::api::WorkspaceApi;
use dbapp_core::models::{
    CatalogInfo, ClusterInfo, SchemaInfo, TableInfo, UserInfo, WarehouseInfo,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Clone)]
struct ServerState {
    workspace: WorkspaceApi,
}

#[derive(Debug, Serialize)]
struct CurrentUser {
    #[serde(rename = "userName")]
    user_name: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    active: bool,
}

impl From<UserInfo> for CurrentUser {
    fn from(user: UserInfo) -> Self {
        Self {
            user_name: user.user_name_or_unknown().to_string(),
            active: user.is_active(),
            display_name: user.display_name,
        }
    }
}

/// Workspace call failure, reported as a 500 with a `detail` message.
struct FetchError {
    what: &'static str,
    source: anyhow::Error,
}

impl FetchError {
    fn new(what: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self { what, source }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        warn!(error = %self.source, "Failed to fetch {}", self.what);
        let detail = format!("Failed to fetch {}: {}", self.what, self.source);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn current_user(State(state): State<ServerState>) -> Result<Json<CurrentUser>, FetchError> {
    let user = state
        .workspace
        .current_user()
        .await
        .map_err(FetchError::new("user info"))?;
    Ok(Json(user.into()))
}

async fn warehouses(
    State(state): State<ServerState>,
) -> Result<Json<Vec<WarehouseInfo>>, FetchError> {
    let warehouses = state
        .workspace
        .list_warehouses()
        .await
        .map_err(FetchError::new("warehouses"))?;
    Ok(Json(warehouses))
}

async fn clusters(State(state): State<ServerState>) -> Result<Json<Vec<ClusterInfo>>, FetchError> {
    let clusters = state
        .workspace
        .list_clusters()
        .await
        .map_err(FetchError::new("clusters"))?;
    Ok(Json(clusters))
}

async fn cluster(
    State(state): State<ServerState>,
    Path(cluster_id): Path<String>,
) -> Result<Json<ClusterInfo>, FetchError> {
    let cluster = state
        .workspace
        .get_cluster(&cluster_id)
        .await
        .map_err(FetchError::new("cluster"))?;
    Ok(Json(cluster))
}

async fn catalogs(State(state): State<ServerState>) -> Result<Json<Vec<CatalogInfo>>, FetchError> {
    let catalogs = state
        .workspace
        .list_catalogs()
        .await
        .map_err(FetchError::new("catalogs"))?;
    Ok(Json(catalogs))
}

async fn schemas(
    State(state): State<ServerState>,
    Path(catalog): Path<String>,
) -> Result<Json<Vec<SchemaInfo>>, FetchError> {
    let schemas = state
        .workspace
        .list_schemas(&catalog)
        .await
        .map_err(FetchError::new("schemas"))?;
    Ok(Json(schemas))
}

async fn tables(
    State(state): State<ServerState>,
    Path((catalog, schema)): Path<(String, String)>,
) -> Result<Json<Vec<TableInfo>>, FetchError> {
    let tables = state
        .workspace
        .list_tables(&catalog, &schema)
        .await
        .map_err(FetchError::new("tables"))?;
    Ok(Json(tables))
}

async fn table(
    State(state): State<ServerState>,
    Path(full_name): Path<String>,
) -> Result<Json<TableInfo>, FetchError> {
    let table = state
        .workspace
        .get_table(&full_name)
        .await
        .map_err(FetchError::new("table info"))?;
    Ok(Json(table))
}

pub fn router(workspace: WorkspaceApi) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/user/me", get(current_user))
        .route("/api/warehouses", get(warehouses))
        .route("/api/clusters", get(clusters))
        .route("/api/clusters/:cluster_id", get(cluster))
        .route("/api/catalogs", get(catalogs))
        .route("/api/catalogs/:catalog/schemas", get(schemas))
        .route("/api/catalogs/:catalog/schemas/:schema/tables", get(tables))
        .route("/api/tables/:full_name", get(table))
        .with_state(ServerState { workspace })
}

pub async fn serve(workspace: WorkspaceApi, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Web API listening");
    println!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, router(workspace)).await?;
    Ok(())
}
