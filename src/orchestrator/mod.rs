// src/orchestrator/mod.rs
//! Sequences résumé upload, job text acquisition, remote analysis and
//! presentation, and owns every user-visible message.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::bridge::JobTextSource;
use crate::core::{AnalysisService, FsOps};
use crate::presenter::AnalysisView;
use crate::storage::{ResumeRecord, ResumeStore};
use crate::types::{AnalysisResponse, AnalyzeRequest};

pub mod state;

pub use state::{AnalysisError, Phase, UiState};
use state::{
    MSG_ANALYZING, MSG_NO_JOB_TEXT, MSG_NO_RESUME, MSG_UPLOADING, MSG_UPLOAD_FAILED,
    MSG_UPLOAD_OK,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    /// Another upload or analysis was still running; nothing happened.
    Busy,
    MissingResume,
    MissingJobText,
    Completed,
    Failed(AnalysisError),
}

pub struct AnalysisOrchestrator {
    store: ResumeStore,
    job_source: Arc<dyn JobTextSource>,
    service: Arc<dyn AnalysisService>,
    state: watch::Sender<UiState>,
}

impl AnalysisOrchestrator {
    pub fn new(
        store: ResumeStore,
        job_source: Arc<dyn JobTextSource>,
        service: Arc<dyn AnalysisService>,
    ) -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self {
            store,
            job_source,
            service,
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Receive every state change, for rendering
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut UiState)) {
        self.state.send_modify(apply);
    }

    /// Atomically move from `Idle` into `phase`. Returns `false` if busy.
    fn enter(&self, phase: Phase, message: &str) -> bool {
        self.state.send_if_modified(|state| {
            if state.phase.is_busy() {
                return false;
            }
            state.phase = phase;
            state.message = message.to_string();
            state.result = None;
            state.last_error = None;
            true
        })
    }

    /// Pick up a résumé stored by an earlier session.
    pub async fn initialize(&self) -> Result<()> {
        let record = self.store.load_resume().await?;
        self.update(|state| match &record {
            Some(record) => {
                state.has_resume = true;
                state.resume_name = record.name.clone();
            }
            None => {
                state.has_resume = false;
                state.resume_name.clear();
            }
        });
        Ok(())
    }

    pub fn set_job_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.job_text = text);
    }

    pub async fn upload_file(&self, path: &Path) -> Result<ResumeRecord> {
        if !self.enter(Phase::Uploading, MSG_UPLOADING) {
            anyhow::bail!("Another operation is in progress");
        }

        let outcome = self.store_file(path).await;

        self.update(|state| {
            match &outcome {
                Ok(record) => {
                    state.has_resume = true;
                    state.resume_name = record.name.clone();
                    state.message = MSG_UPLOAD_OK.to_string();
                }
                Err(_) => state.message = MSG_UPLOAD_FAILED.to_string(),
            }
            state.phase = Phase::Idle;
        });

        if let Err(e) = &outcome {
            error!("Resume upload from {} failed: {:#}", path.display(), e);
        }
        outcome
    }

    async fn store_file(&self, path: &Path) -> Result<ResumeRecord> {
        let text = FsOps::read_text_lossy(path).await?;
        let name = FsOps::display_name(path);
        self.store.save_resume(&text, &name).await?;
        Ok(ResumeRecord { text, name })
    }

    /// Run one analysis. Résumé check, then job text, then the remote call;
    /// a failed step ends the run with a message and skips the rest.
    pub async fn analyze(&self) -> AnalyzeOutcome {
        if !self.enter(Phase::Analyzing, MSG_ANALYZING) {
            info!("Analyze ignored: another operation is in progress");
            return AnalyzeOutcome::Busy;
        }

        let outcome = self.run_analysis().await;

        self.update(|state| {
            state.loading = false;
            state.phase = Phase::Idle;
        });
        outcome
    }

    async fn run_analysis(&self) -> AnalyzeOutcome {
        let resume = match self.store.load_resume().await {
            Ok(Some(resume)) => resume,
            Ok(None) => return self.stop(AnalyzeOutcome::MissingResume, MSG_NO_RESUME),
            Err(e) => {
                warn!("Failed to read stored resume: {:#}", e);
                return self.stop(AnalyzeOutcome::MissingResume, MSG_NO_RESUME);
            }
        };

        let Some(job_text) = self.resolve_job_text().await else {
            return self.stop(AnalyzeOutcome::MissingJobText, MSG_NO_JOB_TEXT);
        };

        let request = AnalyzeRequest {
            job_text,
            resume_text: resume.text,
        };

        self.update(|state| state.loading = true);
        let response = self.service.analyze(&request).await;

        match response {
            Ok(AnalysisResponse::Completed(result)) => {
                info!(
                    "Analysis complete: score {}, {} required missing",
                    result.match_score,
                    result.missing_required.len()
                );
                let view = AnalysisView::from_result(result);
                self.update(|state| {
                    state.result = Some(view);
                    state.message.clear();
                });
                AnalyzeOutcome::Completed
            }
            Ok(AnalysisResponse::Failed { error }) => {
                self.fail(AnalysisError::Reported(error))
            }
            Err(e) => {
                error!("Analysis request failed: {:#}", e);
                self.fail(AnalysisError::Transport(format!("{:#}", e)))
            }
        }
    }

    /// Pasted text wins; otherwise ask the page. Extracted text is shown in
    /// the job text field.
    async fn resolve_job_text(&self) -> Option<String> {
        let pasted = self.state.borrow().job_text.trim().to_string();
        if !pasted.is_empty() {
            return Some(pasted);
        }

        let extracted = self.job_source.request_job_text().await?;
        self.update(|state| state.job_text = extracted.clone());
        Some(extracted)
    }

    fn stop(&self, outcome: AnalyzeOutcome, message: &str) -> AnalyzeOutcome {
        info!("Analysis stopped: {}", message);
        self.update(|state| state.message = message.to_string());
        outcome
    }

    fn fail(&self, err: AnalysisError) -> AnalyzeOutcome {
        let message = err.user_message();
        self.update(|state| {
            state.message = message;
            state.last_error = Some(err.clone());
        });
        AnalyzeOutcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{TagStatus, TagType};
    use crate::storage::MemoryStorage;
    use crate::types::AnalysisResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct FakeJobSource {
        text: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeJobSource {
        fn new(text: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                text: text.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobTextSource for FakeJobSource {
        async fn request_job_text(&self) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text.clone()
        }
    }

    enum Reply {
        Respond(AnalysisResponse),
        NetworkDown,
    }

    struct FakeService {
        reply: Reply,
        requests: Mutex<Vec<AnalyzeRequest>>,
        started: Notify,
        release: Option<Notify>,
    }

    impl FakeService {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
                started: Notify::new(),
                release: None,
            })
        }

        fn held(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
                started: Notify::new(),
                release: Some(Notify::new()),
            })
        }

        fn requests(&self) -> Vec<AnalyzeRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisService for FakeService {
        async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.started.notify_one();
            if let Some(release) = &self.release {
                release.notified().await;
            }
            match &self.reply {
                Reply::Respond(response) => Ok(response.clone()),
                Reply::NetworkDown => anyhow::bail!("connection refused"),
            }
        }
    }

    fn scenario_result() -> AnalysisResponse {
        AnalysisResponse::Completed(AnalysisResult {
            match_score: 80.0,
            matched_required: vec!["build".to_string()],
            missing_required: vec![],
            matched_preferred: vec!["scalable".to_string()],
            missing_preferred: vec!["systems".to_string()],
            required: vec!["build".to_string()],
            preferred: vec!["scalable".to_string(), "systems".to_string()],
        })
    }

    async fn orchestrator_with(
        resume: Option<&str>,
        source: Arc<FakeJobSource>,
        service: Arc<FakeService>,
    ) -> AnalysisOrchestrator {
        let store = ResumeStore::new(Arc::new(MemoryStorage::new()));
        if let Some(text) = resume {
            store.save_resume(text, "resume.txt").await.unwrap();
        }
        let orchestrator = AnalysisOrchestrator::new(store, source, service);
        orchestrator.initialize().await.unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_analyze_without_resume() {
        let source = FakeJobSource::new(Some("ignored"));
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator = orchestrator_with(None, source.clone(), service.clone()).await;
        orchestrator.set_job_text("Build scalable systems");

        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::MissingResume);

        let state = orchestrator.state();
        assert_eq!(state.message, "Please upload a resume first.");
        assert!(!state.loading);
        assert_eq!(state.phase, Phase::Idle);
        assert!(service.requests().is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_pasted_text() {
        let source = FakeJobSource::new(Some("from the page"));
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator =
            orchestrator_with(Some("I build things"), source.clone(), service.clone()).await;
        orchestrator.set_job_text("Build scalable systems");

        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::Completed);

        assert_eq!(source.calls(), 0);
        assert_eq!(
            service.requests(),
            vec![AnalyzeRequest {
                job_text: "Build scalable systems".to_string(),
                resume_text: "I build things".to_string(),
            }]
        );

        let state = orchestrator.state();
        assert_eq!(state.message, "");
        assert!(!state.loading);
        let tags = state.result.unwrap().tags;
        let count = |tag_type: TagType, status: TagStatus| {
            tags.iter()
                .filter(|t| t.tag_type == tag_type && t.status == status)
                .count()
        };
        assert_eq!(count(TagType::Required, TagStatus::Matched), 1);
        assert_eq!(count(TagType::Required, TagStatus::Missing), 0);
        assert_eq!(count(TagType::Preferred, TagStatus::Matched), 1);
        assert_eq!(count(TagType::Preferred, TagStatus::Missing), 1);
    }

    #[tokio::test]
    async fn test_pasted_text_is_trimmed() {
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator =
            orchestrator_with(Some("cv"), FakeJobSource::new(None), service.clone()).await;
        orchestrator.set_job_text("  \n Rust engineer \n");

        orchestrator.analyze().await;
        assert_eq!(service.requests()[0].job_text, "Rust engineer");
    }

    #[tokio::test]
    async fn test_analyze_without_job_text_or_extraction() {
        let source = FakeJobSource::new(None);
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator = orchestrator_with(Some("cv"), source.clone(), service.clone()).await;
        orchestrator.set_job_text("   ");

        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::MissingJobText);

        let state = orchestrator.state();
        assert_eq!(
            state.message,
            "Unable to auto-extract. Please paste job description."
        );
        assert_eq!(source.calls(), 1);
        assert!(service.requests().is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_extracted_text_fills_job_text() {
        let source = FakeJobSource::new(Some("Kafka and Flink"));
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator = orchestrator_with(Some("cv"), source, service.clone()).await;

        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::Completed);
        assert_eq!(orchestrator.state().job_text, "Kafka and Flink");
        assert_eq!(service.requests()[0].job_text, "Kafka and Flink");
    }

    #[tokio::test]
    async fn test_network_failure() {
        let service = FakeService::new(Reply::NetworkDown);
        let orchestrator =
            orchestrator_with(Some("cv"), FakeJobSource::new(None), service).await;
        orchestrator.set_job_text("Build scalable systems");

        let outcome = orchestrator.analyze().await;
        assert!(matches!(
            outcome,
            AnalyzeOutcome::Failed(AnalysisError::Transport(_))
        ));

        let state = orchestrator.state();
        assert_eq!(state.message, "Error analyzing resume");
        assert!(!state.loading);
        assert!(state.result.is_none());
        assert!(matches!(state.last_error, Some(AnalysisError::Transport(_))));
    }

    #[tokio::test]
    async fn test_service_reported_error_is_shown_verbatim() {
        let service = FakeService::new(Reply::Respond(AnalysisResponse::Failed {
            error: "job_text too short".to_string(),
        }));
        let orchestrator =
            orchestrator_with(Some("cv"), FakeJobSource::new(None), service).await;
        orchestrator.set_job_text("Go");

        assert_eq!(
            orchestrator.analyze().await,
            AnalyzeOutcome::Failed(AnalysisError::Reported("job_text too short".to_string()))
        );
        assert_eq!(orchestrator.state().message, "Error: job_text too short");
    }

    #[tokio::test]
    async fn test_loading_spans_only_the_remote_call_and_gates_retries() {
        let service = FakeService::held(Reply::Respond(scenario_result()));
        let orchestrator = Arc::new(
            orchestrator_with(Some("cv"), FakeJobSource::new(None), service.clone()).await,
        );
        orchestrator.set_job_text("Build scalable systems");
        assert!(!orchestrator.state().loading);

        let first = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.analyze().await }
        });

        service.started.notified().await;
        let in_flight = orchestrator.state();
        assert!(in_flight.loading);
        assert!(!in_flight.can_analyze());
        assert_eq!(in_flight.message, "Analyzing...");

        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::Busy);

        if let Some(release) = &service.release {
            release.notify_one();
        }
        assert_eq!(first.await.unwrap(), AnalyzeOutcome::Completed);

        assert_eq!(service.requests().len(), 1);
        let done = orchestrator.state();
        assert!(!done.loading);
        assert!(done.can_analyze());
    }

    #[tokio::test]
    async fn test_new_analysis_clears_previous_result() {
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator =
            orchestrator_with(Some("cv"), FakeJobSource::new(None), service).await;
        orchestrator.set_job_text("Build");
        orchestrator.analyze().await;
        assert!(orchestrator.state().result.is_some());

        orchestrator.set_job_text("");
        assert_eq!(orchestrator.analyze().await, AnalyzeOutcome::MissingJobText);
        assert!(orchestrator.state().result.is_none());
    }

    #[tokio::test]
    async fn test_upload_file_stores_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane_doe.txt");
        tokio::fs::write(&path, "Rust, Tokio, Postgres").await.unwrap();

        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator = orchestrator_with(None, FakeJobSource::new(None), service).await;
        let mut updates = orchestrator.subscribe();
        assert!(!orchestrator.state().has_resume);

        let record = orchestrator.upload_file(&path).await.unwrap();
        assert_eq!(record.name, "jane_doe.txt");

        let state = orchestrator.state();
        assert!(state.has_resume);
        assert_eq!(state.resume_name, "jane_doe.txt");
        assert_eq!(state.message, "Resume uploaded successfully");
        assert_eq!(state.phase, Phase::Idle);
        assert!(updates.has_changed().unwrap());

        let stored = orchestrator.store.load_resume().await.unwrap().unwrap();
        assert_eq!(stored.text, "Rust, Tokio, Postgres");
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_previous_state() {
        let service = FakeService::new(Reply::Respond(scenario_result()));
        let orchestrator =
            orchestrator_with(Some("old cv"), FakeJobSource::new(None), service).await;

        let result = orchestrator
            .upload_file(Path::new("/definitely/not/here.pdf"))
            .await;
        assert!(result.is_err());

        let state = orchestrator.state();
        assert_eq!(state.message, "Error uploading resume");
        assert!(state.has_resume);
        assert_eq!(state.resume_name, "resume.txt");
        assert_eq!(state.phase, Phase::Idle);
    }
}
