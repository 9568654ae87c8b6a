//! Request/response envelopes.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"id": 7, "route": "inventory/get"}
//! <- {"id": 7, "result": {"count": 0, "nInventories": 0, "updateEnabled": false, "tags": []}}
//! ```
//!
//! `id` is optional and echoed verbatim (`null` when absent). Route
//! handlers never fail, so `error` only appears for lines that are not a
//! request or that name an unknown route.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tagstream_reader::ReaderDriver;
use tagstream_service::{Route, RpcHandler, RpcResponse};
use tracing::debug;

/// Inbound request envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcRequest {
    /// Correlation id chosen by the caller.
    #[serde(default)]
    pub id: Value,

    /// Route path, with or without a leading `/`.
    pub route: String,

    /// Accepted for compatibility; every route is parameterless.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outbound reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcReply {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Either a route payload or a transport error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    #[serde(rename = "result")]
    Result(RpcResponse),
    #[serde(rename = "error")]
    Error(String),
}

impl RpcReply {
    pub fn result(id: Value, response: RpcResponse) -> Self {
        Self {
            id,
            outcome: Outcome::Result(response),
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Error(message.into()),
        }
    }
}

/// Answer one request line.
pub async fn respond<D: ReaderDriver>(handler: &RpcHandler<D>, line: &str) -> RpcReply {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Malformed request line");
            return RpcReply::error(Value::Null, format!("Invalid request: {e}"));
        }
    };

    match request.route.parse::<Route>() {
        Ok(route) => RpcReply::result(request.id, handler.call(route).await),
        Err(e) => RpcReply::error(request.id, e.to_string()),
    }
}
