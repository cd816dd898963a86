//! AI analysis collaborator client
//!
//! Sends the transcript plus the rubric questionnaire to the analysis
//! service and returns its raw structured payload. The payload is *not*
//! validated here; that is the normalizer's job.

use callqa_common::rubric::Rubric;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::RawAnalysis;

const USER_AGENT: &str = "CallQA/0.1.0 (+https://github.com/callqa/callqa)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Analysis client errors
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Analysis service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

/// AI analysis collaborator interface
pub trait Analyzer {
    fn analyze(
        &self,
        transcript: &str,
    ) -> impl std::future::Future<Output = Result<RawAnalysis, AnalyzeError>> + Send;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    transcript: &'a str,
    questionnaire: Vec<QuestionnaireEntry>,
}

/// One rubric question as presented to the analysis service
#[derive(Debug, Serialize)]
struct QuestionnaireEntry {
    category: &'static str,
    question: &'static str,
    max_score: u32,
}

fn questionnaire() -> Vec<QuestionnaireEntry> {
    Rubric::get()
        .categories()
        .iter()
        .flat_map(|category| {
            category.items.iter().map(|item| QuestionnaireEntry {
                category: category.name,
                question: item.prompt,
                max_score: item.max_points,
            })
        })
        .collect()
}

/// HTTP analysis client
pub struct AnalysisClient {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl AnalysisClient {
    pub fn new(url: String, api_key: Option<String>) -> Result<Self, AnalyzeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalyzeError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            api_key,
        })
    }
}

impl Analyzer for AnalysisClient {
    async fn analyze(&self, transcript: &str) -> Result<RawAnalysis, AnalyzeError> {
        let request = AnalyzeRequest {
            transcript,
            questionnaire: questionnaire(),
        };

        tracing::debug!(chars = transcript.len(), "Requesting call analysis");

        let mut builder = self.http_client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AnalyzeError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::ServiceUnavailable(format!(
                "HTTP {status}: {error_text}"
            )));
        }

        let raw: RawAnalysis = response
            .json()
            .await
            .map_err(|e| AnalyzeError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            sentiment = %raw.sentiment,
            scored_items = raw.scores.len(),
            "Analysis response received"
        );
        Ok(raw)
    }
}
