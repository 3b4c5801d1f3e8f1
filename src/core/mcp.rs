//! Wire envelopes shared by every request dialect.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

use crate::core::error::GatewayError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "mysql-mcp-gateway";

/// How a response should be framed on the way out. Legacy `type` envelopes
/// never carried `jsonrpc` and tagged responses with `type` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    JsonRpc,
    Legacy,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RpcResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<&'static str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<J>,
}

pub fn ok(framing: Framing, id: J, result: J) -> RpcResp {
    match framing {
        Framing::JsonRpc => RpcResp {
            jsonrpc: Some(JSONRPC_VERSION),
            kind: None,
            id,
            result: Some(result),
            error: None,
        },
        Framing::Legacy => RpcResp {
            jsonrpc: None,
            kind: Some("response"),
            id,
            result: Some(result),
            error: None,
        },
    }
}

pub fn err(framing: Framing, id: J, code: i32, msg: impl Into<String>) -> RpcResp {
    let error = Some(RpcErr {
        code,
        message: msg.into(),
        data: None,
    });
    match framing {
        Framing::JsonRpc => RpcResp {
            jsonrpc: Some(JSONRPC_VERSION),
            kind: None,
            id,
            result: None,
            error,
        },
        Framing::Legacy => RpcResp {
            jsonrpc: None,
            kind: Some("error"),
            id,
            result: None,
            error,
        },
    }
}

pub fn from_gateway_error(framing: Framing, id: J, e: &GatewayError) -> RpcResp {
    err(framing, id, e.code(), e.to_string())
}

/// Input that could not be decoded has no id to correlate with.
pub fn parse_error(detail: impl Into<String>) -> RpcResp {
    from_gateway_error(Framing::JsonRpc, J::Null, &GatewayError::Parse(detail.into()))
}

/// Unsolicited message: no `id`, never answered.
#[derive(Serialize, Debug, Clone)]
pub struct Notification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: J,
}

impl Notification {
    pub fn new(method: &'static str, params: J) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: J,
    pub server_info: ServerInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn current() -> Self {
        Self {
            name: SERVER_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rpc_ok_carries_version_and_no_type() {
        let v = serde_json::to_value(ok(Framing::JsonRpc, json!(7), json!({"x": 1}))).unwrap();
        assert_eq!(v, json!({"jsonrpc": "2.0", "id": 7, "result": {"x": 1}}));
    }

    #[test]
    fn legacy_error_is_tagged_and_omits_jsonrpc() {
        let v = serde_json::to_value(err(Framing::Legacy, json!("a"), -32601, "unknown tool: x"))
            .unwrap();
        assert!(v.get("jsonrpc").is_none());
        assert_eq!(v["type"], "error");
        assert_eq!(v["id"], "a");
        assert_eq!(v["error"]["code"], -32601);
    }

    #[test]
    fn null_result_is_still_serialized() {
        let s = serde_json::to_string(&ok(Framing::JsonRpc, json!(1), J::Null)).unwrap();
        assert!(s.contains("\"result\":null"), "got {s}");
    }

    #[test]
    fn parse_error_has_null_id() {
        let v = serde_json::to_value(parse_error("bad json")).unwrap();
        assert_eq!(v["id"], J::Null);
        assert_eq!(v["error"]["code"], -32700);
    }

    #[test]
    fn it_serializes_initialize_result_in_camel_case() {
        let v = InitializeResult {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: json!({}),
            server_info: ServerInfo::current(),
        };
        let s = serde_json::to_string(&v).unwrap();
        assert!(s.contains("serverInfo"));
        assert!(s.contains("protocolVersion"));
    }
}
