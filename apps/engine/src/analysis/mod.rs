//! CV Analysis Client — the single point of entry for the optional external
//! CV analysis service.
//!
//! The service is a soft dependency: the CV_PARSE processor consults it when
//! configured, and on ANY failure (network, non-2xx, malformed or incomplete
//! response) falls back to local heuristic extraction. That fallback is a
//! hard contract enforced in `worker`, so errors from this module must never
//! surface as task failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const ANALYZE_PATH: &str = "/analyze-cv";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unusable response shape: {0}")]
    Shape(String),
}

impl From<AnalysisError> for crate::errors::EngineError {
    fn from(e: AnalysisError) -> Self {
        crate::errors::EngineError::ExternalService(e.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    cv_url: &'a str,
    candidate_id: Uuid,
}

/// Structured analysis returned by the external service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAnalysis {
    pub parsed_text: String,
    pub extracted_skills: Vec<String>,
}

/// Seam for the CV analysis backend, carried by the worker pool as
/// `Option<Arc<dyn CvAnalyzer>>` so tests can inject doubles.
#[async_trait]
pub trait CvAnalyzer: Send + Sync {
    async fn analyze(&self, cv_url: &str, candidate_id: Uuid) -> Result<CvAnalysis, AnalysisError>;
}

/// HTTP implementation against `<base>/analyze-cv`.
/// Retries on 429 and 5xx with exponential backoff.
pub struct HttpCvAnalyzer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpCvAnalyzer {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CvAnalyzer for HttpCvAnalyzer {
    async fn analyze(&self, cv_url: &str, candidate_id: Uuid) -> Result<CvAnalysis, AnalysisError> {
        let url = format!("{}{}", self.base_url, ANALYZE_PATH);
        let body = AnalyzeRequest {
            cv_url,
            candidate_id,
        };

        let mut last_error: Option<AnalysisError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Analysis call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AnalysisError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Analysis service returned {status}: {message}");
                last_error = Some(AnalysisError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(AnalysisError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let analysis: CvAnalysis = response
                .json()
                .await
                .map_err(|e| AnalysisError::Shape(e.to_string()))?;

            if analysis.parsed_text.trim().is_empty() {
                return Err(AnalysisError::Shape(
                    "parsedText missing or empty".to_string(),
                ));
            }

            debug!(
                "Analysis call succeeded: {} chars parsed, {} skills",
                analysis.parsed_text.len(),
                analysis.extracted_skills.len()
            );

            return Ok(analysis);
        }

        Err(last_error.unwrap_or(AnalysisError::Api {
            status: 0,
            message: format!("gave up after {MAX_RETRIES} attempts"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_response_deserializes_camel_case() {
        let json = r#"{
            "parsedText": "Ten years of Rust and Kubernetes.",
            "extractedSkills": ["Rust", "Kubernetes"]
        }"#;
        let analysis: CvAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.parsed_text, "Ten years of Rust and Kubernetes.");
        assert_eq!(analysis.extracted_skills.len(), 2);
    }

    #[test]
    fn test_missing_fields_are_a_shape_error_at_parse_time() {
        let json = r#"{"parsedText": "text only"}"#;
        assert!(serde_json::from_str::<CvAnalysis>(json).is_err());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = AnalyzeRequest {
            cv_url: "https://cdn.example.com/cv.pdf",
            candidate_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("cvUrl").is_some());
        assert!(value.get("candidateId").is_some());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let analyzer = HttpCvAnalyzer::new("http://localhost:9000/", "key");
        assert_eq!(analyzer.base_url, "http://localhost:9000");
    }
}
