//! Statement builders for `create_or_modify_table`.
//!
//! Identifiers and types are interpolated as given; the database is the
//! only judge of whether they are valid.

use crate::core::error::GatewayError;
use crate::domain::{ColumnSpec, UniqueKey};

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

pub fn create_table_sql(
    table: &str,
    columns: &[ColumnSpec],
    unique_keys: &[UniqueKey],
) -> Result<String, GatewayError> {
    if table.trim().is_empty() {
        return Err(GatewayError::invalid_params("missing required field: table_name"));
    }
    if columns.is_empty() {
        return Err(GatewayError::invalid_params("columns must not be empty"));
    }

    let mut defs = Vec::with_capacity(columns.len() + unique_keys.len());
    for (i, col) in columns.iter().enumerate() {
        defs.push(column_def(i, col)?);
    }
    for key in unique_keys {
        if key.name.trim().is_empty() {
            return Err(GatewayError::invalid_params("unique key is missing `name`"));
        }
        defs.push(format!("UNIQUE KEY {} ({})", key.name, key.columns.render()));
    }

    Ok(format!("CREATE TABLE {table} ({})", defs.join(", ")))
}

fn column_def(i: usize, col: &ColumnSpec) -> Result<String, GatewayError> {
    if col.name.trim().is_empty() {
        return Err(GatewayError::invalid_params(format!("column {i} is missing `name`")));
    }
    if col.sql_type.trim().is_empty() {
        return Err(GatewayError::invalid_params(format!(
            "column `{}` is missing `type`",
            col.name
        )));
    }

    let mut def = format!("{} {}", col.name, col.sql_type);
    if col.not_null {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = col.default_clause() {
        def.push_str(" DEFAULT ");
        def.push_str(&default);
    }
    if col.auto_increment {
        def.push_str(" AUTO_INCREMENT");
    }
    if col.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    Ok(def)
}
