use thiserror::Error;

use crate::clients::driver::DriverError;

/// JSON-RPC codes shared by every dialect the gateway speaks.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const NOT_INITIALIZED: i32 = -32002;
    pub const NOT_CONNECTED: i32 = -32001;
    pub const DRIVER_ERROR: i32 = -32000;
}

/// Gateway-wide error model. Every variant maps onto one stable code so
/// callers can branch on the kind instead of matching driver messages.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MethodNotFound(String),

    #[error("server not initialized: send `initialize` first")]
    NotInitialized,

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("database not connected, call connect_db first")]
    NotConnected,

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn code(&self) -> i32 {
        match self {
            GatewayError::Parse(_) => codes::PARSE_ERROR,
            GatewayError::InvalidRequest(_) => codes::INVALID_REQUEST,
            GatewayError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            GatewayError::NotInitialized => codes::NOT_INITIALIZED,
            GatewayError::InvalidParams(_) => codes::INVALID_PARAMS,
            GatewayError::NotConnected => codes::NOT_CONNECTED,
            GatewayError::Driver(_) => codes::DRIVER_ERROR,
            GatewayError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        GatewayError::InvalidParams(msg.into())
    }

    pub fn unknown_tool(name: &str) -> Self {
        GatewayError::MethodNotFound(format!("unknown tool: {name}"))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_each_kind_to_a_stable_code() {
        assert_eq!(GatewayError::Parse("x".into()).code(), -32700);
        assert_eq!(GatewayError::unknown_tool("nope").code(), -32601);
        assert_eq!(GatewayError::invalid_params("sql").code(), -32602);
        assert_eq!(GatewayError::NotInitialized.code(), -32002);
        assert_eq!(GatewayError::NotConnected.code(), -32001);
        assert_eq!(GatewayError::Internal("boom".into()).code(), -32603);
    }

    #[test]
    fn driver_message_passes_through_verbatim() {
        let e: GatewayError = DriverError::new("Table 'db.t' doesn't exist").into();
        assert_eq!(e.code(), -32000);
        assert_eq!(e.to_string(), "Table 'db.t' doesn't exist");
    }

    #[test]
    fn serde_failures_are_internal() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(GatewayError::from(bad).code(), -32603);
    }
}
