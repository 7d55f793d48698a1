// src/core/mod.rs
//! Configuration, file system and remote service plumbing

pub mod analysis_client;
pub mod config_manager;
pub mod fs_ops;

pub use analysis_client::{AnalysisClient, AnalysisService};
pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
