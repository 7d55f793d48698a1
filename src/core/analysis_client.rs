// src/core/analysis_client.rs
//! HTTP client for the keyword analysis service

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, trace, warn};

use crate::types::{AnalysisResponse, AnalyzeRequest};

pub const ANALYZE_AUTO_ENDPOINT: &str = "/analyze/auto";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// `Err` only for transport or decoding failures; a service-reported
    /// problem comes back as `AnalysisResponse::Failed`.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResponse>;
}

pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_AUTO_ENDPOINT)
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResponse> {
        let url = self.endpoint_url();
        info!(
            "Calling analysis service: {} (job {} chars, resume {} chars)",
            url,
            request.job_text.len(),
            request.resume_text.len()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to call analysis service")?;

        let status = response.status();
        trace!("Response status: {}", status);

        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        decode_response(status, &response_text)
    }
}

/// Classify a raw service reply. Non-2xx replies only count as a reported
/// error when they carry the service's `{ "error": ... }` body.
pub fn decode_response(status: reqwest::StatusCode, body: &str) -> Result<AnalysisResponse> {
    if status.is_success() {
        let parsed = serde_json::from_str::<AnalysisResponse>(body)
            .with_context(|| format!("Failed to parse analysis response: {}", body))?;
        if let AnalysisResponse::Failed { error } = &parsed {
            warn!("Analysis service reported: {}", error);
        }
        return Ok(parsed);
    }

    match serde_json::from_str::<AnalysisResponse>(body) {
        Ok(failed @ AnalysisResponse::Failed { .. }) => Ok(failed),
        _ => {
            error!("Analysis service error response {}: {}", status, body);
            anyhow::bail!("Service returned error status {}: {}", status, body)
        }
    }
}
