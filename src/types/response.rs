// src/types/response.rs
//! Payloads exchanged with the keyword analysis service

use serde::{Deserialize, Serialize};

// ===== Request Types =====

/// Body of `POST /analyze/auto`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub job_text: String,
    pub resume_text: String,
}

// ===== Service Response Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: f64,
    #[serde(default)]
    pub matched_required: Vec<String>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub matched_preferred: Vec<String>,
    #[serde(default)]
    pub missing_preferred: Vec<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
}

impl AnalysisResult {
    pub fn required_total(&self) -> usize {
        self.required
            .len()
            .max(self.matched_required.len() + self.missing_required.len())
    }

    pub fn preferred_total(&self) -> usize {
        self.preferred
            .len()
            .max(self.matched_preferred.len() + self.missing_preferred.len())
    }
}

/// Either a logical failure reported by the service or a completed analysis.
///
/// `Failed` is tried first so any body carrying an `error` string wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Failed { error: String },
    Completed(AnalysisResult),
}
