//! JSON-RPC 2.0 framing for the control socket

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{notification::Notification, request::Request, response::Response};

pub const JSONRPC_VERSION: &str = "2.0";

/// Call envelope carrying a [`Request`] and its correlation id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub request: Request,
    pub id: RequestId,
}

/// Reply envelope; exactly one of `result` and `error` is set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

/// Server push; carries no id and is never answered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub notification: Notification,
}

/// Correlation id attached to a call and echoed in its reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    /// Reply id for requests whose own id could not be read
    Null,
}

/// Error object carried in a failed reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[allow(dead_code)]
impl JsonRpcError {
    // Codes reserved by JSON-RPC 2.0
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Codes specific to this service
    pub const NO_ADAPTER: i32 = -32010;
    pub const PERMISSION_DENIED: i32 = -32011;
    pub const ADAPTER_DISABLED: i32 = -32012;
    pub const ADVERTISE_FAILED: i32 = -32013;

    fn coded(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::coded(Self::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::coded(Self::INVALID_REQUEST, message)
    }

    pub fn method_not_found() -> Self {
        Self::coded(Self::METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::coded(Self::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::coded(Self::INTERNAL_ERROR, message)
    }

    pub fn no_adapter() -> Self {
        Self::coded(Self::NO_ADAPTER, "No Bluetooth adapter available")
    }

    pub fn permission_denied() -> Self {
        Self::coded(Self::PERMISSION_DENIED, "Advertising permission not granted")
    }

    pub fn adapter_disabled() -> Self {
        Self::coded(Self::ADAPTER_DISABLED, "Bluetooth adapter is disabled")
    }

    pub fn advertise_failed(message: impl Into<String>) -> Self {
        Self::coded(Self::ADVERTISE_FAILED, message)
    }
}

impl JsonRpcRequest {
    pub fn new(request: Request, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            request,
            id,
        }
    }
}

impl JsonRpcResponse {
    pub fn success(result: Response, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

impl JsonRpcNotification {
    pub fn new(notification: Notification) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            notification,
        }
    }
}
