// src/extraction/mod.rs
use serde::{Deserialize, Serialize};

pub mod page;
pub mod text_extractor;

pub use page::{LivePage, MutationObserver};
pub use text_extractor::TextExtractor;

/// What the page side reports back for a job description request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    #[serde(rename = "jobTitle")]
    pub title: String,
    #[serde(rename = "jobText")]
    pub text: String,
}
