//! The database gateway: one connection, six operations, no protocol.

use std::sync::Arc;

use serde_json::Value;

use crate::clients::driver::{Connector, DbHandle};
use crate::core::error::GatewayError;
use crate::domain::{BindParams, ColumnSpec, ConnectParams, Row, UniqueKey};
use crate::tools::ddl;

pub struct DatabaseGateway {
    connector: Arc<dyn Connector>,
    params: Option<ConnectParams>,
    handle: Option<Box<dyn DbHandle>>,
}

impl DatabaseGateway {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            params: None,
            handle: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn connection(&self) -> Option<&ConnectParams> {
        self.params.as_ref()
    }

    /// Replaces the current connection. The old one is closed first, so a
    /// failed attempt leaves the gateway disconnected.
    pub async fn connect(&mut self, params: ConnectParams) -> Result<(), GatewayError> {
        if params.host.trim().is_empty() {
            return Err(GatewayError::invalid_params("missing required field: host"));
        }
        if params.user.trim().is_empty() {
            return Err(GatewayError::invalid_params("missing required field: user"));
        }

        self.close().await;
        let handle = self.connector.open(&params).await.map_err(|e| {
            tracing::warn!(host = %params.host, user = %params.user, error = %e, "connect failed");
            GatewayError::Driver(e)
        })?;
        tracing::info!(
            host = %params.host,
            port = params.port,
            database = params.database.as_deref().unwrap_or(""),
            "database connected"
        );
        self.handle = Some(handle);
        self.params = Some(params);
        Ok(())
    }

    pub async fn run_query(
        &mut self,
        sql: &str,
        binds: &BindParams,
    ) -> Result<Vec<Row>, GatewayError> {
        let handle = self.handle()?;
        Ok(handle.fetch_all(sql, binds).await?)
    }

    pub async fn run_command(
        &mut self,
        sql: &str,
        binds: &BindParams,
    ) -> Result<u64, GatewayError> {
        let handle = self.handle()?;
        Ok(handle.execute(sql, binds).await?)
    }

    pub async fn list_tables(&mut self) -> Result<Vec<String>, GatewayError> {
        let rows = self.run_query("SHOW TABLES", &BindParams::None).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some((_, Value::String(name))) => Some(name),
                Some((_, Value::Null)) | None => None,
                Some((_, other)) => Some(other.to_string()),
            })
            .collect())
    }

    pub async fn describe_table(&mut self, table: &str) -> Result<Vec<Row>, GatewayError> {
        if table.trim().is_empty() {
            return Err(GatewayError::invalid_params("missing required field: table_name"));
        }
        self.run_query(&format!("DESCRIBE {table}"), &BindParams::None)
            .await
    }

    /// Drops any existing table of the same name, then creates it afresh.
    /// Existing rows are discarded.
    pub async fn create_or_alter_table(
        &mut self,
        table: &str,
        columns: &[ColumnSpec],
        unique_keys: &[UniqueKey],
    ) -> Result<(), GatewayError> {
        let create = ddl::create_table_sql(table, columns, unique_keys)?;
        let handle = self.handle()?;
        handle
            .execute(&ddl::drop_table_sql(table), &BindParams::None)
            .await?;
        handle.execute(&create, &BindParams::None).await?;
        tracing::info!(table = %table, columns = columns.len(), "table recreated");
        Ok(())
    }

    /// Cleanup never fails: a close error is logged and the handle dropped.
    pub async fn close(&mut self) {
        self.params = None;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.close().await {
                tracing::warn!(error = %e, "error while closing database connection");
            } else {
                tracing::debug!("database connection closed");
            }
        }
    }

    fn handle(&mut self) -> Result<&mut Box<dyn DbHandle>, GatewayError> {
        self.handle.as_mut().ok_or(GatewayError::NotConnected)
    }
}
