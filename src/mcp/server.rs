use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::backend::DeviceBackend;
use crate::config::McpConfig;
use crate::error::{AppError, Result};
use crate::mcp::registry::ToolRegistry;
use crate::mcp::tools::ToolDispatcher;
use crate::mcp::types::{Outcome, RequestEnvelope, ToolCallParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    Initialize,
    Initialized,
    Cancelled,
    ToolsList,
    ToolsCall,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 5] = [
        RpcMethod::Initialize,
        RpcMethod::Initialized,
        RpcMethod::Cancelled,
        RpcMethod::ToolsList,
        RpcMethod::ToolsCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RpcMethod::Initialize => "initialize",
            RpcMethod::Initialized => "notifications/initialized",
            RpcMethod::Cancelled => "notifications/cancelled",
            RpcMethod::ToolsList => "tools/list",
            RpcMethod::ToolsCall => "tools/call",
        }
    }
}

/// Top-level dispatcher for decoded envelopes. Holds only read-only state and
/// is shared across requests.
pub struct McpServer {
    methods: HashMap<&'static str, RpcMethod>,
    tools: ToolDispatcher,
    identity: McpConfig,
}

impl McpServer {
    pub fn new(identity: McpConfig, backend: Arc<dyn DeviceBackend>) -> Self {
        let registry = Arc::new(ToolRegistry::new());
        Self {
            methods: RpcMethod::ALL
                .iter()
                .map(|&method| (method.as_str(), method))
                .collect(),
            tools: ToolDispatcher::new(registry, backend),
            identity,
        }
    }

    pub fn resolve(&self, method: &str) -> Option<RpcMethod> {
        self.methods.get(method).copied()
    }

    pub async fn handle(&self, request: &RequestEnvelope) -> Result<Outcome> {
        let Some(method) = self.resolve(&request.method) else {
            debug!(method = %request.method, "unknown method");
            return Ok(Outcome::SoftError(format!(
                "Unknown method: {}",
                request.method
            )));
        };

        debug!(method = method.as_str(), id = request.id, "dispatching");
        let params = request.params.as_ref();

        match method {
            RpcMethod::Initialize => self.initialize(params),
            // Cancellation is acknowledged only; nothing in flight is interrupted.
            RpcMethod::Initialized | RpcMethod::Cancelled => Ok(Outcome::status_ok()),
            RpcMethod::ToolsList => self.tools_list(),
            RpcMethod::ToolsCall => self.tools_call(params).await,
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Result<Outcome> {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .ok_or_else(|| AppError::missing_field("protocolVersion"))?
            .as_str()
            .ok_or_else(|| AppError::invalid_field("protocolVersion", "a string"))?;

        Ok(Outcome::Success(json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "resources": { "subscribe": true },
                "tools": { "listChanged": true }
            },
            "serverInfo": {
                "name": self.identity.server_name,
                "version": self.identity.server_version
            }
        })))
    }

    fn tools_list(&self) -> Result<Outcome> {
        let tools = serde_json::to_value(self.tools.registry().list())?;
        Ok(Outcome::Success(json!({ "tools": tools })))
    }

    async fn tools_call(&self, params: Option<&Value>) -> Result<Outcome> {
        let params = params.ok_or_else(|| AppError::missing_field("params"))?;
        let call: ToolCallParams = serde_json::from_value(params.clone())
            .map_err(|e| AppError::InvalidParams(e.to_string()))?;

        let envelope = self.tools.call(&call.name, &call.arguments).await?;
        Ok(Outcome::Success(serde_json::to_value(envelope)?))
    }
}
