//! Notification message types

use serde::{Deserialize, Serialize};

use crate::core::types::{AdvertiserStatus, Notice};

/// Notification messages pushed from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// Gate status changed
    StatusChanged(StatusChangedParams),

    /// User-facing advisory raised by the gate
    Notice(NoticeParams),
}

/// Parameters for status_changed notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChangedParams {
    #[serde(flatten)]
    pub advertiser: AdvertiserStatus,
}

/// Parameters for notice notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeParams {
    pub notice: Notice,
    pub message: String,
}

impl StatusChangedParams {
    pub fn new(advertiser: AdvertiserStatus) -> Self {
        Self { advertiser }
    }
}

impl NoticeParams {
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            message: notice.to_string(),
        }
    }
}
