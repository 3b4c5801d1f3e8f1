//! Dialect detection: every accepted request shape is normalized into one
//! [`Request`] before dispatch.
//!
//! Accepted shapes:
//! - legacy: `{ "type": "getServerInfo" | "executeTool", "id", "tool", "params" }`
//! - JSON-RPC with a nested call: `{ "method": .., "params": { "tool", "args" } }`
//! - JSON-RPC with a control verb, an MCP verb, or the tool name as `method`

use serde_json::{Map, Value as J};

use crate::core::error::GatewayError;
use crate::core::mcp::Framing;

/// How the result of a call should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStyle {
    /// The tool's JSON as is.
    Plain,
    /// MCP `CallToolResult` with `content` and `structuredContent`.
    Content,
}

/// Canonical tool invocation, whatever envelope it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: Option<J>,
    pub name: String,
    pub args: J,
    pub style: ResultStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Legacy `getServerInfo`.
    ServerInfo,
    Initialize,
    Shutdown,
    Exit,
    Ping,
    ListTools,
    Call(ToolCall),
    /// Id-less `notifications/*`; never answered.
    Notification(String),
}

#[derive(Debug)]
pub struct Inbound {
    pub framing: Framing,
    pub id: Option<J>,
    pub request: Result<Request, GatewayError>,
}

impl Inbound {
    pub fn id_or_null(&self) -> J {
        self.id.clone().unwrap_or(J::Null)
    }
}

pub fn classify(msg: J) -> Inbound {
    let J::Object(mut obj) = msg else {
        return Inbound {
            framing: Framing::JsonRpc,
            id: None,
            request: Err(GatewayError::InvalidRequest("expected a JSON object".into())),
        };
    };
    let id = obj.remove("id").filter(|v| !v.is_null());

    if let Some(J::String(method)) = obj.remove("method") {
        let params = obj.remove("params").unwrap_or(J::Null);
        let request = json_rpc(&method, params, id.clone());
        return Inbound {
            framing: Framing::JsonRpc,
            id,
            request,
        };
    }

    if let Some(J::String(kind)) = obj.get("type").cloned() {
        let request = legacy(&kind, obj, id.clone());
        return Inbound {
            framing: Framing::Legacy,
            id,
            request,
        };
    }

    Inbound {
        framing: Framing::JsonRpc,
        id,
        request: Err(GatewayError::InvalidRequest(
            "missing string field `method` or `type`".into(),
        )),
    }
}

fn legacy(kind: &str, mut obj: Map<String, J>, id: Option<J>) -> Result<Request, GatewayError> {
    match kind {
        "getServerInfo" => Ok(Request::ServerInfo),
        "executeTool" => {
            let name = match obj.remove("tool") {
                Some(J::String(name)) if !name.is_empty() => name,
                _ => return Err(GatewayError::invalid_params("missing tool name")),
            };
            Ok(Request::Call(ToolCall {
                id,
                name,
                args: obj.remove("params").unwrap_or(J::Null),
                style: ResultStyle::Plain,
            }))
        }
        other => Err(GatewayError::MethodNotFound(format!(
            "unknown request type: {other}"
        ))),
    }
}

fn json_rpc(method: &str, params: J, id: Option<J>) -> Result<Request, GatewayError> {
    match method {
        "initialize" => Ok(Request::Initialize),
        "shutdown" => Ok(Request::Shutdown),
        "exit" => Ok(Request::Exit),
        "ping" => Ok(Request::Ping),
        "MCP/listTools" | "tools/list" | "tools.list" => Ok(Request::ListTools),
        "MCP/callTool" => {
            let name = take_str(&params, &["tool", "name"])
                .ok_or_else(|| GatewayError::invalid_params("missing tool name"))?;
            Ok(Request::Call(ToolCall {
                id,
                name,
                args: take_args(&params, &["parameters", "arguments", "args"]),
                style: ResultStyle::Plain,
            }))
        }
        "tools/call" | "tools.call" => {
            let name = take_str(&params, &["name"])
                .ok_or_else(|| GatewayError::invalid_params("missing tool name"))?;
            Ok(Request::Call(ToolCall {
                id,
                name,
                args: take_args(&params, &["arguments"]),
                style: ResultStyle::Content,
            }))
        }
        m if m.starts_with("notifications/") && id.is_none() => {
            Ok(Request::Notification(m.to_string()))
        }
        m => match take_str(&params, &["tool"]) {
            // `{ method, params: { tool, args } }`
            Some(name) => Ok(Request::Call(ToolCall {
                id,
                name,
                args: take_args(&params, &["args", "arguments", "parameters"]),
                style: ResultStyle::Plain,
            })),
            // The method is the tool name itself.
            None => Ok(Request::Call(ToolCall {
                id,
                name: m.to_string(),
                args: params,
                style: ResultStyle::Plain,
            })),
        },
    }
}

fn take_str(params: &J, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| params.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn take_args(params: &J, keys: &[&str]) -> J {
    keys.iter()
        .find_map(|k| params.get(*k).cloned())
        .unwrap_or(J::Null)
}
