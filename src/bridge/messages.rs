// src/bridge/messages.rs
use serde::{Deserialize, Serialize};

/// Requests the UI side can send into a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeRequest {
    #[serde(rename = "GET_JOB_DESCRIPTION")]
    GetJobDescription,
    #[serde(other)]
    Unknown,
}
