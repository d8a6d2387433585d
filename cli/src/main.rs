use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use serde_json::{json, Value as JsonValue};
use static_db_core::models::ColumnType;
use static_db_core::query::{Order, RawQuery, SelectQuery, SqliteFlavor};
use static_db_core::{PageRequest, RawTables, RowSet, SharedDataSource, StaticDbConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Query JSON tables through an in-memory SQL database")]
struct Args {
    /// JSON file mapping table names to arrays of rows
    #[clap(env = "STATIC_DB_DATA")]
    data: String,

    /// Config file path
    #[clap(short, long, env = "STATIC_DB_CONFIG")]
    config: Option<String>,

    /// Print the inferred metadata
    #[clap(short, long)]
    metadata: bool,

    /// Run a SELECT statement
    #[clap(short, long)]
    sql: Option<String>,

    /// Fetch a page of a table
    #[clap(short, long)]
    table: Option<String>,

    /// Page number, starting at 1
    #[clap(long, default_value_t = 1)]
    page: u64,

    /// Rows per page
    #[clap(long)]
    page_size: Option<u64>,

    /// Sort column for paged fetches, `column` or `column:desc`
    #[clap(long)]
    order_by: Vec<String>,

    /// Do not treat an `id` column as the primary key
    #[clap(long)]
    no_primary_key: bool,

    /// Remap a resolved type, e.g. `REAL=TEXT`
    #[clap(long = "override", value_name = "FROM=TO")]
    overrides: Vec<String>,

    /// Rows sampled per column
    #[clap(long, env = "STATIC_DB_SAMPLE_SIZE")]
    sample_size: Option<usize>,

    /// Rows per insert statement
    #[clap(long, env = "STATIC_DB_CHUNK_SIZE")]
    chunk_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    let config = build_config(&args)?;
    let tables = load_tables(&args.data)?;

    info!("Loaded {} tables from {}", tables.len(), args.data);
    let source = SharedDataSource::with_config(tables, config);

    if args.metadata {
        let metadata = source.metadata().await?;
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    }

    if let Some(sql) = &args.sql {
        let query = RawQuery::parse(sql, &SqliteFlavor)?;
        let rows = source.execute(Box::new(query)).await?;
        println!("{}", serde_json::to_string_pretty(&rows_to_json(&rows))?);
    }

    if let Some(table) = &args.table {
        let mut request = PageRequest::new().page(args.page);
        if let Some(page_size) = args.page_size {
            request = request.page_size(page_size);
        }
        for order in &args.order_by {
            let (column, order) = parse_order(order)?;
            request = request.order_by(column, order);
        }

        let page_size = request.page_size;
        let page = source
            .fetch_page(SelectQuery::from_table(table.as_str()), request)
            .await?;
        let output = json!({
            "page": args.page.max(1),
            "pageCount": page.page_count(page_size),
            "total": page.total,
            "rows": rows_to_json(&page.rows),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    source.close().await?;
    Ok(())
}

/// Load the config file, then apply command-line overrides
fn build_config(args: &Args) -> Result<StaticDbConfig> {
    let mut config = match &args.config {
        Some(path) => StaticDbConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => StaticDbConfig::new(),
    };

    if args.no_primary_key {
        config.inference.enforce_primary_key = false;
    }
    if let Some(sample_size) = args.sample_size {
        config.inference.sample_size = sample_size;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.ingestion.chunk_size = chunk_size;
    }
    for spec in &args.overrides {
        let (from, to) = parse_override(spec)?;
        config.inference.overrides.insert(from, to);
    }

    Ok(config)
}

fn load_tables(path: &str) -> Result<RawTables> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let tables = RawTables::from_json_str(&json).with_context(|| format!("Failed to parse {}", path))?;
    Ok(tables)
}

fn parse_override(spec: &str) -> Result<(ColumnType, ColumnType)> {
    let (from, to) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid override {:?}, expected FROM=TO", spec))?;
    Ok((from.parse()?, to.parse()?))
}

fn parse_order(spec: &str) -> Result<(String, Order)> {
    let (column, direction) = match spec.rsplit_once(':') {
        Some((column, direction)) => (column, direction),
        None => (spec, "asc"),
    };
    let order = match direction.to_ascii_lowercase().as_str() {
        "asc" => Order::Asc,
        "desc" => Order::Desc,
        other => return Err(anyhow!("Invalid sort direction {:?}", other)),
    };
    Ok((column.to_string(), order))
}

fn rows_to_json(rows: &RowSet) -> JsonValue {
    JsonValue::Array(rows.iter().map(|row| row.to_json()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["static-db", "data.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("REAL=TEXT").unwrap(),
            (ColumnType::Real, ColumnType::Text)
        );
        assert_eq!(
            parse_override("integer=real").unwrap(),
            (ColumnType::Integer, ColumnType::Real)
        );
        assert!(parse_override("REAL").is_err());
        assert!(parse_override("REAL=NUMBER").is_err());
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("salary").unwrap(), ("salary".to_string(), Order::Asc));
        assert_eq!(parse_order("salary:DESC").unwrap(), ("salary".to_string(), Order::Desc));
        assert!(parse_order("salary:sideways").is_err());
    }

    #[test]
    fn test_args_override_config() {
        let args = args(&["--no-primary-key", "--override", "DATETIME=TEXT", "--chunk-size", "50"]);
        let config = build_config(&args).unwrap();

        assert!(!config.inference.enforce_primary_key);
        assert_eq!(config.inference.overrides.apply(ColumnType::DateTime), ColumnType::Text);
        assert_eq!(config.ingestion.chunk_size, 50);
        assert_eq!(config.inference.sample_size, 500);
    }

    #[test]
    fn test_load_tables() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"users": [{{"id": 1, "name": "Ann"}}]}}"#).unwrap();

        let tables = load_tables(file.path().to_str().unwrap()).unwrap();
        assert_eq!(tables.get("users").map(|rows| rows.len()), Some(1));
        assert!(load_tables("/nonexistent/tables.json").is_err());
    }
}
