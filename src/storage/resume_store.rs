// src/storage/resume_store.rs
use super::ExtensionStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

pub const RESUME_TEXT_KEY: &str = "resume_text";
pub const RESUME_NAME_KEY: &str = "resume_name";
pub const DEFAULT_RESUME_NAME: &str = "Stored resume";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub text: String,
    pub name: String,
}

/// Holds the single current résumé. A new upload replaces the old one.
#[derive(Clone)]
pub struct ResumeStore {
    storage: Arc<dyn ExtensionStorage>,
}

impl ResumeStore {
    pub fn new(storage: Arc<dyn ExtensionStorage>) -> Self {
        Self { storage }
    }

    pub async fn save_resume(&self, text: &str, name: &str) -> Result<()> {
        let mut items = Map::new();
        items.insert(RESUME_TEXT_KEY.to_string(), Value::String(text.to_string()));
        items.insert(RESUME_NAME_KEY.to_string(), Value::String(name.to_string()));
        self.storage.set(items).await?;

        info!("Stored resume '{}' ({} chars)", name, text.len());
        Ok(())
    }

    pub async fn load_resume(&self) -> Result<Option<ResumeRecord>> {
        let items = self
            .storage
            .get(&[RESUME_TEXT_KEY, RESUME_NAME_KEY])
            .await?;

        let text = match items.get(RESUME_TEXT_KEY).and_then(Value::as_str) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => return Ok(None),
        };

        let name = items
            .get(RESUME_NAME_KEY)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_RESUME_NAME)
            .to_string();

        Ok(Some(ResumeRecord { text, name }))
    }

    pub async fn has_resume(&self) -> Result<bool> {
        Ok(self.load_resume().await?.is_some())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage
            .remove(&[RESUME_TEXT_KEY, RESUME_NAME_KEY])
            .await?;
        info!("Cleared stored resume");
        Ok(())
    }
}
