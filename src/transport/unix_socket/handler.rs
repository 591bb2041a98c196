//! JSON-RPC request handler for Unix socket transport

use std::sync::Arc;

use serde_json::Value;

use crate::{
    backend::RadioBackend,
    core::{error::ServiceError, service::DoorRemote},
    protocol::{
        JsonRpcError, JsonRpcRequest, JsonRpcResponse, Request, RequestId, Response,
        StatusResponse, TriggerParams, TriggeredResponse,
    },
};

/// Methods served over the socket
const METHODS: [&str; 2] = ["trigger", "get_status"];

/// JSON-RPC request handler
pub struct RequestHandler<R: RadioBackend> {
    remote: Arc<DoorRemote<R>>,
}

impl<R: RadioBackend> RequestHandler<R> {
    /// Create a new request handler
    pub fn new(remote: Arc<DoorRemote<R>>) -> Self {
        Self { remote }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.request {
            Request::Trigger(params) => self.handle_trigger(params, request.id).await,
            Request::GetStatus => self.handle_get_status(request.id).await,
        }
    }

    async fn handle_trigger(&self, params: TriggerParams, id: RequestId) -> JsonRpcResponse {
        let hold = params.hold();
        match self.remote.tap(params.command, hold).await {
            Ok(()) => JsonRpcResponse::success(
                Response::Triggered(TriggeredResponse::ok(
                    params.command,
                    hold.as_millis() as u64,
                )),
                id,
            ),
            Err(e) => {
                let error = match e {
                    ServiceError::NoAdapter => JsonRpcError::no_adapter(),
                    ServiceError::PermissionDenied => JsonRpcError::permission_denied(),
                    ServiceError::AdapterDisabled => JsonRpcError::adapter_disabled(),
                    ServiceError::Radio(e) => JsonRpcError::advertise_failed(e.to_string()),
                };
                JsonRpcResponse::error(error, id)
            }
        }
    }

    async fn handle_get_status(&self, id: RequestId) -> JsonRpcResponse {
        // A probe refreshes the snapshot against the radio without
        // prompting, so status answers stay live.
        let status = self.remote.probe().await;
        JsonRpcResponse::success(Response::Status(StatusResponse::ok(status)), id)
    }

    /// Build the error response for a line that did not parse as a request
    ///
    /// Distinguishes malformed JSON, a frame without a method and an
    /// unknown method, keeping whatever request id can still be read.
    pub fn parse_failure_response(line: &str, parse_error: &serde_json::Error) -> JsonRpcResponse {
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            return JsonRpcResponse::error(JsonRpcError::parse_error(), RequestId::Null);
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
            .unwrap_or(RequestId::Null);

        match value.get("method").and_then(Value::as_str) {
            None => JsonRpcResponse::error(JsonRpcError::invalid_request("Missing method"), id),
            Some(method) if !METHODS.contains(&method) => {
                JsonRpcResponse::error(JsonRpcError::method_not_found(), id)
            }
            Some(_) => {
                JsonRpcResponse::error(JsonRpcError::invalid_params(parse_error.to_string()), id)
            }
        }
    }
}
