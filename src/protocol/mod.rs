//! Protocol message definitions

pub mod jsonrpc;
pub mod notification;
pub mod request;
pub mod response;

pub use {
    jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId},
    notification::{Notification, NoticeParams, StatusChangedParams},
    request::{Request, TriggerParams},
    response::{Response, StatusResponse, TriggeredResponse},
};
