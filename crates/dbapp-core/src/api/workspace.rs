//! Typed access to the workspace REST API.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::auth::probe::SCIM_ME_PATH;
use crate::models::{
    CatalogInfo, CatalogList, ChatRequest, ChatResponse, ClusterInfo, ClusterList, SchemaInfo,
    SchemaList, ServingEndpoint, ServingEndpointList, StatementRequest, StatementResponse,
    TableInfo, TableList, UserInfo, WarehouseInfo, WarehouseList,
};

use super::ApiClient;

const WAREHOUSES_PATH: &str = "/api/2.0/sql/warehouses";
const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";
const CLUSTERS_PATH: &str = "/api/2.0/clusters";
const SERVING_ENDPOINTS_PATH: &str = "/api/2.0/serving-endpoints";
const CATALOGS_PATH: &str = "/api/2.1/unity-catalog/catalogs";
const SCHEMAS_PATH: &str = "/api/2.1/unity-catalog/schemas";
const TABLES_PATH: &str = "/api/2.1/unity-catalog/tables";

/// Percent-encode a name used as one path segment. Dots are kept.
fn segment(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Workspace API client. The wrapped client must point at `DATABRICKS_HOST`.
#[derive(Debug, Clone)]
pub struct WorkspaceApi {
    client: ApiClient,
}

impl WorkspaceApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn current_user(&self) -> Result<UserInfo> {
        self.client.get_json(SCIM_ME_PATH).await
    }

    // ===== SQL warehouses =====

    pub async fn list_warehouses(&self) -> Result<Vec<WarehouseInfo>> {
        let list: WarehouseList = self.client.get_json(WAREHOUSES_PATH).await?;
        debug!(count = list.warehouses.len(), "Listed warehouses");
        Ok(list.warehouses)
    }

    pub async fn get_warehouse(&self, warehouse_id: &str) -> Result<WarehouseInfo> {
        self.client
            .get_json(&format!("{}/{}", WAREHOUSES_PATH, segment(warehouse_id)))
            .await
    }

    /// Ask a stopped warehouse to start. Returns once the request is accepted.
    pub async fn start_warehouse(&self, warehouse_id: &str) -> Result<()> {
        info!(warehouse_id, "Starting warehouse");
        let body = json!({});
        self.client
            .post(&format!("{}/{}/start", WAREHOUSES_PATH, segment(warehouse_id)), Some(&body))
            .await?;
        Ok(())
    }

    pub async fn execute_statement(&self, request: &StatementRequest) -> Result<StatementResponse> {
        debug!(warehouse_id = %request.warehouse_id, "Executing statement");
        self.client.post_json(STATEMENTS_PATH, request).await
    }

    // ===== Clusters =====

    pub async fn list_clusters(&self) -> Result<Vec<ClusterInfo>> {
        let list: ClusterList = self
            .client
            .get_json(&format!("{}/list", CLUSTERS_PATH))
            .await?;
        Ok(list.clusters)
    }

    pub async fn get_cluster(&self, cluster_id: &str) -> Result<ClusterInfo> {
        self.client
            .get_json_query(&format!("{}/get", CLUSTERS_PATH), &[("cluster_id", cluster_id)])
            .await
    }

    // ===== Model serving =====

    pub async fn list_serving_endpoints(&self) -> Result<Vec<ServingEndpoint>> {
        let list: ServingEndpointList = self.client.get_json(SERVING_ENDPOINTS_PATH).await?;
        Ok(list.endpoints)
    }

    pub async fn get_serving_endpoint(&self, name: &str) -> Result<ServingEndpoint> {
        self.client
            .get_json(&format!("{}/{}", SERVING_ENDPOINTS_PATH, segment(name)))
            .await
    }

    pub async fn query_serving_endpoint(
        &self,
        name: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse> {
        self.client
            .post_json(&format!("/serving-endpoints/{}/invocations", segment(name)), request)
            .await
    }

    // ===== Unity Catalog =====

    pub async fn list_catalogs(&self) -> Result<Vec<CatalogInfo>> {
        let list: CatalogList = self.client.get_json(CATALOGS_PATH).await?;
        debug!(count = list.catalogs.len(), "Listed catalogs");
        Ok(list.catalogs)
    }

    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<SchemaInfo>> {
        let list: SchemaList = self
            .client
            .get_json_query(SCHEMAS_PATH, &[("catalog_name", catalog)])
            .await?;
        Ok(list.schemas)
    }

    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableInfo>> {
        let list: TableList = self
            .client
            .get_json_query(TABLES_PATH, &[("catalog_name", catalog), ("schema_name", schema)])
            .await?;
        Ok(list.tables)
    }

    /// Table details including columns. `full_name` is `catalog.schema.table`.
    pub async fn get_table(&self, full_name: &str) -> Result<TableInfo> {
        self.client
            .get_json(&format!("{}/{}", TABLES_PATH, segment(full_name)))
            .await
    }
}
