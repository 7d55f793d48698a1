// src/bridge/page_bridge.rs
use super::messages::BridgeRequest;
use super::tabs::TabChannel;
use super::JobTextSource;
use crate::extraction::JobDescription;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Asks the foreground tab for its job description.
pub struct PageBridge {
    tabs: Arc<dyn TabChannel>,
}

impl PageBridge {
    pub fn new(tabs: Arc<dyn TabChannel>) -> Self {
        Self { tabs }
    }

    /// Extracted job text, or `None` when it could not be obtained for any
    /// reason (no active tab, no listener, delivery failure, empty text).
    pub async fn request_job_text(&self) -> Option<String> {
        let tab = match self.tabs.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                warn!("Active tab lookup failed: {}", e);
                return None;
            }
        };

        let response = match self
            .tabs
            .send_message(tab, &BridgeRequest::GetJobDescription)
            .await
        {
            Ok(Some(response)) => response,
            Ok(None) => {
                debug!("Tab {} sent no response", tab);
                return None;
            }
            Err(e) => {
                warn!("Job description request to tab {} failed: {}", tab, e);
                return None;
            }
        };

        match serde_json::from_value::<JobDescription>(response) {
            Ok(description) if !description.text.is_empty() => {
                info!(
                    "Auto-extracted '{}' from tab {} ({} chars)",
                    description.title,
                    tab,
                    description.text.len()
                );
                Some(description.text)
            }
            Ok(_) => {
                debug!("Tab {} returned an empty job description", tab);
                None
            }
            Err(e) => {
                warn!("Malformed job description from tab {}: {}", tab, e);
                None
            }
        }
    }
}

#[async_trait]
impl JobTextSource for PageBridge {
    async fn request_job_text(&self) -> Option<String> {
        PageBridge::request_job_text(self).await
    }
}
