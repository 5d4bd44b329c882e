use anyhow::{Context, Result};
use dbapp_core::api::WorkspaceApi;
use dbapp_core::models::{format_row, StatementRequest, StatementResponse, WarehouseInfo};
use dbapp_core::AppContext;

async fn pick_warehouse(workspace: &WorkspaceApi, id: Option<&str>) -> Result<Option<WarehouseInfo>> {
    if let Some(id) = id {
        return workspace.get_warehouse(id).await.map(Some);
    }
    let warehouses = workspace.list_warehouses().await?;
    println!("Available SQL warehouses: {}", warehouses.len());
    Ok(warehouses.into_iter().next())
}

/// Lines describing a finished statement: status, schema, rows and count.
fn render_response(response: &StatementResponse) -> Vec<String> {
    let mut lines = vec![format!("Statement ID: {}", response.statement_id)];

    let Some(state) = response.state() else {
        lines.push("No status information available from response.".to_string());
        return lines;
    };
    lines.push(format!("Status: {}", state));

    if !response.succeeded() {
        lines.push(format!("Query failed with status: {}", state));
        if let Some(error) = response.error() {
            lines.push(format!("Error: {}", error));
        }
        return lines;
    }

    lines.push(String::new());
    lines.push("Query executed successfully!".to_string());

    let columns = response.columns();
    if !columns.is_empty() {
        lines.push(String::new());
        lines.push("Result Schema:".to_string());
        lines.push("-".repeat(40));
        for (i, column) in columns.iter().enumerate() {
            lines.push(format!(
                "Column {}: {} ({})",
                i + 1,
                column.name,
                column.type_name.as_deref().unwrap_or("UNKNOWN")
            ));
        }
        lines.push(String::new());
    }

    let rows = response.rows();
    if rows.is_empty() {
        lines.push("No data returned from query.".to_string());
        return lines;
    }

    lines.push("Query Results:".to_string());
    lines.push("-".repeat(40));
    if !columns.is_empty() {
        let header = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let rule = "-".repeat(header.len());
        lines.push(header);
        lines.push(rule);
    }
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.push(String::new());
    lines.push(format!("Total rows returned: {}", rows.len()));
    lines
}

pub async fn run(ctx: &AppContext, query: &str, warehouse: Option<&str>) -> Result<()> {
    let workspace = ctx.workspace()?;

    let Some(warehouse) = pick_warehouse(&workspace, warehouse).await? else {
        println!("No SQL warehouses found. Please create a SQL warehouse first.");
        return Ok(());
    };
    println!("Using warehouse: {} (ID: {})", warehouse.name, warehouse.id);
    println!("Warehouse state: {}", warehouse.state_display());
    println!();

    if !warehouse.is_running() {
        println!("Starting warehouse...");
        workspace
            .start_warehouse(&warehouse.id)
            .await
            .with_context(|| format!("Failed to start warehouse {}", warehouse.id))?;
        println!("Warehouse started.");
        println!();
    }

    println!("SQL Query: {}", query);
    println!("{}", "=".repeat(60));

    let request = StatementRequest::new(&warehouse.id, query);
    let response = workspace.execute_statement(&request).await?;
    for line in render_response(&response) {
        println!("{}", line);
    }
    Ok(())
}
