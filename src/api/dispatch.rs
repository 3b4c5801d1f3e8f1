//! Per-line protocol state machine.

use serde_json::{json, Map, Value as J};

use crate::api::dialect::{self, Request, ResultStyle, ToolCall};
use crate::core::content::StructuredJson;
use crate::core::error::GatewayError;
use crate::core::mcp::{self, Framing, InitializeResult, RpcResp, ServerInfo, PROTOCOL_VERSION};
use crate::domain::ConnectDefaults;
use crate::infra::runtime::session::Session;
use crate::tools::registry::{self, ToolKind};

/// What the transport should do with one input line.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Reply(RpcResp),
    /// Nothing to write (notifications).
    Silent,
    /// Run cleanup and stop; nothing is written.
    Exit,
}

pub struct Dispatcher {
    session: Session,
    defaults: ConnectDefaults,
    require_initialize: bool,
}

impl Dispatcher {
    pub fn new(session: Session, defaults: ConnectDefaults, require_initialize: bool) -> Self {
        Self {
            session,
            defaults,
            require_initialize,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        self.session.touch();

        let msg: J = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable input line");
                return Outcome::Reply(mcp::parse_error(e.to_string()));
            }
        };

        let inbound = dialect::classify(msg);
        let framing = inbound.framing;
        let id = inbound.id_or_null();
        let request = match inbound.request {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(id = %id, code = e.code(), error = %e, "rejected envelope");
                return Outcome::Reply(mcp::from_gateway_error(framing, id, &e));
            }
        };

        match request {
            Request::Exit => {
                tracing::info!("exit requested");
                self.session.begin_shutdown();
                Outcome::Exit
            }
            Request::Notification(method) => {
                tracing::debug!(method = %method, "notification");
                Outcome::Silent
            }
            other => match self.execute(other, framing).await {
                Ok(result) => Outcome::Reply(mcp::ok(framing, id, result)),
                Err(e) => Outcome::Reply(mcp::from_gateway_error(framing, id, &e)),
            },
        }
    }

    async fn execute(&mut self, request: Request, framing: Framing) -> Result<J, GatewayError> {
        match request {
            Request::Initialize => {
                self.session.mark_initialized();
                tracing::info!("client initialized");
                Ok(serde_json::to_value(InitializeResult {
                    protocol_version: PROTOCOL_VERSION.into(),
                    capabilities: json!({ "tools": {} }),
                    server_info: ServerInfo::current(),
                })?)
            }
            // Identity only; the JSON-RPC handshake state is left alone.
            Request::ServerInfo => Ok(legacy_server_info()),
            Request::Ping => Ok(json!({})),
            Request::Shutdown => {
                tracing::info!("shutdown requested");
                self.session.begin_shutdown();
                Ok(J::Null)
            }
            Request::ListTools => {
                self.ensure_ready(framing)?;
                Ok(json!({ "tools": registry::list() }))
            }
            Request::Call(call) => {
                let kind = ToolKind::resolve(&call.name)
                    .ok_or_else(|| GatewayError::unknown_tool(&call.name))?;
                self.ensure_ready(framing)?;
                self.call_tool(kind, call).await
            }
            Request::Exit | Request::Notification(_) => Ok(J::Null),
        }
    }

    async fn call_tool(&mut self, kind: ToolKind, call: ToolCall) -> Result<J, GatewayError> {
        tracing::debug!(id = ?call.id, tool = %call.name, "dispatching tool call");
        let gateway = &mut self.session.gateway;
        let out = registry::invoke(kind, &call.args, gateway, &self.defaults).await?;
        Ok(match call.style {
            ResultStyle::Plain => out,
            ResultStyle::Content => StructuredJson::from(out).into_call_result(),
        })
    }

    /// Legacy envelopes predate the handshake and are always accepted.
    fn ensure_ready(&self, framing: Framing) -> Result<(), GatewayError> {
        let enforced = self.require_initialize && framing == Framing::JsonRpc;
        if enforced && !self.session.is_initialized() {
            return Err(GatewayError::NotInitialized);
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.session.begin_shutdown();
        self.session.teardown().await;
    }
}

fn legacy_server_info() -> J {
    let tools: Map<String, J> = registry::list()
        .into_iter()
        .map(|t| {
            let parameters = t.input_schema.get("properties").cloned().unwrap_or(json!({}));
            (
                t.name.to_string(),
                json!({ "description": t.description, "parameters": parameters }),
            )
        })
        .collect();
    let info = ServerInfo::current();
    json!({ "name": info.name, "version": info.version, "tools": tools })
}
