//! MySQL collaborator backed by a single, non-pooled `sqlx` connection.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Executor, Row as _, ValueRef};

use crate::clients::driver::{Connector, DbHandle, DriverError};
use crate::domain::{BindParams, ConnectParams, Row};

#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn open(&self, params: &ConnectParams) -> Result<Box<dyn DbHandle>, DriverError> {
        let mut opts = MySqlConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .charset("utf8mb4");
        if !params.password.is_empty() {
            opts = opts.password(&params.password);
        }
        if let Some(db) = params.database.as_deref().filter(|d| !d.is_empty()) {
            opts = opts.database(db);
        }

        tracing::debug!(
            host = %params.host,
            port = params.port,
            user = %params.user,
            "mysql.connect"
        );
        let conn = opts.connect().await.map_err(driver_error)?;
        Ok(Box::new(MySqlHandle { conn }))
    }
}

/// Server-side autocommit is left on, so every statement commits as soon as
/// it completes.
pub struct MySqlHandle {
    conn: MySqlConnection,
}

#[async_trait]
impl DbHandle for MySqlHandle {
    async fn fetch_all(&mut self, sql: &str, binds: &BindParams) -> Result<Vec<Row>, DriverError> {
        let rows = match bound_query(sql, binds)? {
            Some(q) => q.fetch_all(&mut self.conn).await,
            None => (&mut self.conn).fetch_all(sql).await,
        }
        .map_err(driver_error)?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn execute(&mut self, sql: &str, binds: &BindParams) -> Result<u64, DriverError> {
        let done = match bound_query(sql, binds)? {
            Some(q) => q.execute(&mut self.conn).await,
            None => (&mut self.conn).execute(sql).await,
        }
        .map_err(driver_error)?;
        Ok(done.rows_affected())
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.conn.close().await.map_err(driver_error)
    }
}

fn driver_error(e: sqlx::Error) -> DriverError {
    match e {
        sqlx::Error::Database(db) => DriverError::new(db.message()),
        other => DriverError::new(other.to_string()),
    }
}

/// A prepared statement when there is something to bind, `None` otherwise.
/// Unbound SQL goes out as a plain `&str`, which sqlx sends over the text
/// protocol: MySQL refuses `CREATE TRIGGER`, `LOCK TABLES` and friends as
/// prepared statements.
fn bound_query<'q>(
    sql: &'q str,
    binds: &BindParams,
) -> Result<Option<Query<'q, MySql, MySqlArguments>>, DriverError> {
    match binds {
        BindParams::None => Ok(None),
        BindParams::Positional(values) => {
            // Ad-hoc statements; keep them out of the prepared-statement cache.
            let mut q = sqlx::query(sql).persistent(false);
            for v in values {
                q = bind_value(q, v);
            }
            Ok(Some(q))
        }
        BindParams::Named(_) => Err(DriverError::new(
            "named bind parameters are not supported by MySQL; use positional `?` placeholders",
        )),
    }
}

fn bind_value<'q>(
    q: Query<'q, MySql, MySqlArguments>,
    v: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match v {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u)
            } else {
                q.bind(n.as_f64())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        // JSON columns and anything structured travel as text.
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn row_to_json(row: &MySqlRow) -> Row {
    let mut out = Row::new();
    for (idx, col) in row.columns().iter().enumerate() {
        out.insert(col.name().to_string(), cell_to_json(row, idx));
    }
    out
}

fn cell_to_json(row: &MySqlRow, idx: usize) -> Value {
    match row.try_get_raw(idx) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Value::String(v);
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
        return Value::String(v.to_string());
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDate, _>(idx) {
        return Value::String(v.to_string());
    }
    if let Ok(v) = row.try_get::<chrono::NaiveTime, _>(idx) {
        return Value::String(v.to_string());
    }
    if let Ok(v) = row.try_get::<Value, _>(idx) {
        return v;
    }
    // DECIMAL and friends arrive as text on the wire.
    if let Ok(v) = row.try_get_unchecked::<String, _>(idx) {
        return Value::String(v);
    }
    match row.try_get::<Vec<u8>, _>(idx) {
        Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Value::Null,
    }
}
