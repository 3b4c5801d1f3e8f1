//! Static tool catalog: name -> gateway operation.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::error::GatewayError;
use crate::core::tool::{ToolMeta, ToolSpec};
use crate::domain::{BindParams, ColumnSpec, ConnectArgs, ConnectDefaults, UniqueKey};
use crate::infra::logging::log_metric;
use crate::tools::gateway::DatabaseGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ConnectDb,
    CreateOrModifyTable,
    Query,
    Execute,
    ListTables,
    DescribeTable,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::ConnectDb,
        ToolKind::CreateOrModifyTable,
        ToolKind::Query,
        ToolKind::Execute,
        ToolKind::ListTables,
        ToolKind::DescribeTable,
    ];

    /// Canonical names plus the aliases older clients still send.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "connect_db" => Some(ToolKind::ConnectDb),
            "create_or_modify_table" | "create_table" => Some(ToolKind::CreateOrModifyTable),
            "query" | "execute_query" => Some(ToolKind::Query),
            "execute" | "execute_command" => Some(ToolKind::Execute),
            "list_tables" => Some(ToolKind::ListTables),
            "describe_table" => Some(ToolKind::DescribeTable),
            _ => None,
        }
    }
}

impl ToolSpec for ToolKind {
    fn name(&self) -> &'static str {
        match self {
            ToolKind::ConnectDb => "connect_db",
            ToolKind::CreateOrModifyTable => "create_or_modify_table",
            ToolKind::Query => "query",
            ToolKind::Execute => "execute",
            ToolKind::ListTables => "list_tables",
            ToolKind::DescribeTable => "describe_table",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ToolKind::ConnectDb => "Establish connection to a MySQL database",
            ToolKind::CreateOrModifyTable => {
                "Create a table from column definitions. DESTRUCTIVE: an existing table \
                 with the same name is dropped first and its data is lost. Alternatively \
                 pass `query` to run a raw DDL statement."
            }
            ToolKind::Query => "Execute a SELECT query and return all rows",
            ToolKind::Execute => {
                "Execute an INSERT, UPDATE, DELETE or DDL statement; returns affected rows"
            }
            ToolKind::ListTables => "List all tables in the current database",
            ToolKind::DescribeTable => "Get the column structure of a table",
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            ToolKind::ConnectDb => json!({
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer" },
                    "user": { "type": "string" },
                    "password": { "type": "string" },
                    "database": { "type": "string" }
                },
                "required": ["host", "user", "password"]
            }),
            ToolKind::CreateOrModifyTable => json!({
                "type": "object",
                "properties": {
                    "table_name": { "type": "string" },
                    "columns": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "type": { "type": "string" },
                                "not_null": { "type": "boolean" },
                                "default": { "type": "string" },
                                "auto_increment": { "type": "boolean" },
                                "primary_key": { "type": "boolean" }
                            },
                            "required": ["name", "type"]
                        }
                    },
                    "unique_keys": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "columns": { "type": "string" }
                            },
                            "required": ["name", "columns"]
                        }
                    },
                    "query": { "type": "string" },
                    "bind_vars": { "type": "array" }
                }
            }),
            ToolKind::Query | ToolKind::Execute => json!({
                "type": "object",
                "properties": {
                    "sql": { "type": "string" },
                    "params": { "type": ["array", "object"] }
                },
                "required": ["sql"]
            }),
            ToolKind::ListTables => json!({ "type": "object", "properties": {} }),
            ToolKind::DescribeTable => json!({
                "type": "object",
                "properties": { "table_name": { "type": "string" } },
                "required": ["table_name"]
            }),
        }
    }
}

pub fn list() -> Vec<ToolMeta> {
    ToolKind::ALL.iter().map(|t| ToolMeta::of(t)).collect()
}

#[derive(Deserialize)]
struct SqlArgs {
    sql: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Deserialize)]
struct TableArgs {
    #[serde(alias = "table")]
    table_name: String,
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    unique_keys: Vec<UniqueKey>,
}

#[derive(Deserialize)]
struct RawDdlArgs {
    query: String,
    #[serde(default)]
    bind_vars: Option<Value>,
}

#[derive(Deserialize)]
struct DescribeArgs {
    #[serde(alias = "table")]
    table_name: String,
}

fn parse<T: DeserializeOwned>(args: &Value) -> Result<T, GatewayError> {
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args).map_err(|e| GatewayError::invalid_params(e.to_string()))
}

/// Runs one tool against the gateway and shapes its result as JSON.
pub async fn invoke(
    kind: ToolKind,
    args: &Value,
    gateway: &mut DatabaseGateway,
    defaults: &ConnectDefaults,
) -> Result<Value, GatewayError> {
    let name = kind.name();
    tracing::debug!(tool = name, "tool invoked");
    log_metric(name, "calls_total", 1.0);

    let out = run(kind, args, gateway, defaults).await;
    if let Err(e) = &out {
        log_metric(name, "errors_total", 1.0);
        tracing::warn!(tool = name, code = e.code(), error = %e, "tool failed");
    }
    out
}

async fn run(
    kind: ToolKind,
    args: &Value,
    gateway: &mut DatabaseGateway,
    defaults: &ConnectDefaults,
) -> Result<Value, GatewayError> {
    match kind {
        ToolKind::ConnectDb => {
            let params = defaults.resolve(parse::<ConnectArgs>(args)?);
            gateway.connect(params).await?;
            Ok(json!({ "status": "success", "message": "Database connection established" }))
        }
        ToolKind::CreateOrModifyTable => {
            if args.get("query").is_some() {
                let raw: RawDdlArgs = parse(args)?;
                let binds = BindParams::from_json(raw.bind_vars.as_ref())?;
                let affected = gateway.run_command(&raw.query, &binds).await?;
                return Ok(json!({
                    "status": "success",
                    "message": "Statement executed successfully",
                    "affected_rows": affected
                }));
            }
            let t: TableArgs = parse(args)?;
            gateway
                .create_or_alter_table(&t.table_name, &t.columns, &t.unique_keys)
                .await?;
            Ok(json!({
                "status": "success",
                "message": format!("Table {} created successfully", t.table_name)
            }))
        }
        ToolKind::Query => {
            let a: SqlArgs = parse(args)?;
            let binds = BindParams::from_json(a.params.as_ref())?;
            let rows = gateway.run_query(&a.sql, &binds).await?;
            Ok(json!({ "rows": rows }))
        }
        ToolKind::Execute => {
            let a: SqlArgs = parse(args)?;
            let binds = BindParams::from_json(a.params.as_ref())?;
            let affected = gateway.run_command(&a.sql, &binds).await?;
            Ok(json!({ "affected_rows": affected }))
        }
        ToolKind::ListTables => {
            let tables = gateway.list_tables().await?;
            Ok(json!({ "tables": tables }))
        }
        ToolKind::DescribeTable => {
            let a: DescribeArgs = parse(args)?;
            let columns = gateway.describe_table(&a.table_name).await?;
            Ok(json!({ "columns": columns }))
        }
    }
}
