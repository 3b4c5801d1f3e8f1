//! Seam between the gateway and whatever engine actually runs SQL.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{BindParams, ConnectParams, Row};

/// Anything the underlying engine reports. The message is passed through to
/// the caller verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Opens connections. One implementation per engine.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open(&self, params: &ConnectParams) -> Result<Box<dyn DbHandle>, DriverError>;
}

/// A single open connection. Statements are auto-committed.
#[async_trait]
pub trait DbHandle: Send {
    async fn fetch_all(&mut self, sql: &str, binds: &BindParams) -> Result<Vec<Row>, DriverError>;

    /// Runs a statement and returns the affected-row count.
    async fn execute(&mut self, sql: &str, binds: &BindParams) -> Result<u64, DriverError>;

    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}
