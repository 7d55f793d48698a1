use anyhow::Result;
use std::sync::Arc;

pub mod bridge;
pub mod cli;
pub mod core;
pub mod extraction;
pub mod keywords;
pub mod orchestrator;
pub mod presenter;
pub mod storage;
pub mod types;

use crate::bridge::{PageBridge, TabChannel};
use crate::core::{AnalysisClient, ConfigManager};
use crate::orchestrator::AnalysisOrchestrator;
use crate::storage::{FileStorage, ResumeStore};

/// Wire the orchestrator to file-backed storage, the given tabs and the
/// configured analysis service.
pub fn build_orchestrator(
    config: &ConfigManager,
    tabs: Arc<dyn TabChannel>,
) -> Result<AnalysisOrchestrator> {
    let storage = Arc::new(FileStorage::new(&config.settings.storage_path));
    let service = AnalysisClient::new(&config.settings.api_base_url, config.request_timeout())?;

    Ok(AnalysisOrchestrator::new(
        ResumeStore::new(storage),
        Arc::new(PageBridge::new(tabs)),
        Arc::new(service),
    ))
}
