// src/bridge/mod.rs
//! Request/response channel between the UI side and the page side
use async_trait::async_trait;

pub mod messages;
pub mod page_bridge;
pub mod tabs;

pub use messages::BridgeRequest;
pub use page_bridge::PageBridge;
pub use tabs::{ContentEndpoint, InProcessTabs, TabChannel, TabId};

/// Where the orchestrator gets job text from when nothing was pasted.
#[async_trait]
pub trait JobTextSource: Send + Sync {
    async fn request_job_text(&self) -> Option<String>;
}
