use anyhow::Result;
use dbapp_core::models::{CatalogInfo, SchemaInfo, TableInfo};
use dbapp_core::AppContext;

/// How deep into the catalog tree the arguments reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPath {
    Catalogs,
    Schemas { catalog: String },
    Tables { catalog: String, schema: String },
    Table { full_name: String },
}

impl CatalogPath {
    pub fn from_args(catalog: Option<String>, schema: Option<String>, table: Option<String>) -> Self {
        match (catalog, schema, table) {
            (Some(catalog), Some(schema), Some(table)) => CatalogPath::Table {
                full_name: format!("{}.{}.{}", catalog, schema, table),
            },
            (Some(catalog), Some(schema), None) => CatalogPath::Tables { catalog, schema },
            (Some(catalog), None, _) => CatalogPath::Schemas { catalog },
            (None, _, _) => CatalogPath::Catalogs,
        }
    }
}

fn render_catalogs(catalogs: &[CatalogInfo]) -> Vec<String> {
    let mut lines = vec![format!("Catalogs: {}", catalogs.len())];
    for catalog in catalogs {
        match &catalog.comment {
            Some(comment) if !comment.is_empty() => {
                lines.push(format!("  - {} ({})", catalog.name, comment))
            }
            _ => lines.push(format!("  - {}", catalog.name)),
        }
    }
    lines
}

fn render_schemas(catalog: &str, schemas: &[SchemaInfo]) -> Vec<String> {
    let mut lines = vec![format!("Schemas in {}: {}", catalog, schemas.len())];
    lines.extend(schemas.iter().map(|s| format!("  - {}", s.name)));
    lines
}

fn render_tables(catalog: &str, schema: &str, tables: &[TableInfo]) -> Vec<String> {
    let mut lines = vec![format!("Tables in {}.{}: {}", catalog, schema, tables.len())];
    lines.extend(
        tables
            .iter()
            .map(|t| format!("  - {} [{}]", t.name, t.table_type_display())),
    );
    lines
}

fn render_table(table: &TableInfo) -> Vec<String> {
    let name = table.full_name.as_deref().unwrap_or(&table.name);
    let mut lines = vec![
        format!("Table: {}", name),
        format!("Type: {}", table.table_type_display()),
    ];
    if let Some(format) = &table.data_source_format {
        lines.push(format!("Format: {}", format));
    }
    if let Some(owner) = &table.owner {
        lines.push(format!("Owner: {}", owner));
    }
    if let Some(updated) = table.updated() {
        lines.push(format!("Updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    if table.columns.is_empty() {
        lines.push("No column information available.".to_string());
        return lines;
    }
    lines.push(String::new());
    lines.push("Columns:".to_string());
    lines.push("-".repeat(40));
    for column in &table.columns {
        let null = if column.nullable { "" } else { " NOT NULL" };
        lines.push(format!("{} {}{}", column.name, column.type_display(), null));
    }
    lines
}

pub async fn run(ctx: &AppContext, path: CatalogPath) -> Result<()> {
    let workspace = ctx.workspace()?;

    let lines = match path {
        CatalogPath::Catalogs => render_catalogs(&workspace.list_catalogs().await?),
        CatalogPath::Schemas { catalog } => {
            render_schemas(&catalog, &workspace.list_schemas(&catalog).await?)
        }
        CatalogPath::Tables { catalog, schema } => {
            render_tables(&catalog, &schema, &workspace.list_tables(&catalog, &schema).await?)
        }
        CatalogPath::Table { full_name } => render_table(&workspace.get_table(&full_name).await?),
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
