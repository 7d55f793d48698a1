// src/orchestrator/state.rs
use crate::presenter::AnalysisView;

pub const MSG_UPLOADING: &str = "Uploading...";
pub const MSG_UPLOAD_OK: &str = "Resume uploaded successfully";
pub const MSG_UPLOAD_FAILED: &str = "Error uploading resume";
pub const MSG_ANALYZING: &str = "Analyzing...";
pub const MSG_NO_RESUME: &str = "Please upload a resume first.";
pub const MSG_NO_JOB_TEXT: &str = "Unable to auto-extract. Please paste job description.";
pub const MSG_ANALYSIS_FAILED: &str = "Error analyzing resume";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Analyzing,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        self != Phase::Idle
    }
}

/// Why an analysis produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The service answered with an explicit `error` field.
    #[error("{0}")]
    Reported(String),
    /// The request never produced a usable answer.
    #[error("analysis request failed: {0}")]
    Transport(String),
}

impl AnalysisError {
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Reported(message) => format!("Error: {}", message),
            AnalysisError::Transport(_) => MSG_ANALYSIS_FAILED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub job_text: String,
    pub message: String,
    /// True only while the analysis request is in flight
    pub loading: bool,
    pub result: Option<AnalysisView>,
    pub resume_name: String,
    pub has_resume: bool,
    pub phase: Phase,
    pub last_error: Option<AnalysisError>,
}

impl UiState {
    /// Whether the analyze trigger is enabled
    pub fn can_analyze(&self) -> bool {
        !self.phase.is_busy()
    }

    pub fn analyze_label(&self) -> &'static str {
        if self.phase == Phase::Analyzing {
            MSG_ANALYZING
        } else {
            "Analyze"
        }
    }
}
