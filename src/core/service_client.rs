// src/core/service_client.rs
//! HTTP client for the external job service (résumé processing + scraped results)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, trace};

use crate::core::config_manager::ServiceConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::response::{
    ErrorBody, HealthResponse, JobsResponse, ProcessResumeResponse, RankResponse, ResultsResponse,
};

const PROCESS_RESUME_ENDPOINT: &str = "/process-resume";
const RESULTS_ENDPOINT: &str = "/results";
const RANK_ENDPOINT: &str = "/rank";
const JOBS_ENDPOINT: &str = "/jobs";
const HEALTH_ENDPOINT: &str = "/health";

const UPLOAD_FIELD: &str = "file";
const PDF_MIME: &str = "application/pdf";

/// The two calls the session controller makes against the job service.
#[async_trait]
pub trait JobService: Send + Sync + 'static {
    /// Upload a résumé. Resolves only for a `success: true` body carrying a job id.
    async fn process_resume(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> ClientResult<ProcessResumeResponse>;

    /// Read the current status and results of a job.
    async fn fetch_results(&self, job_id: &str) -> ClientResult<ResultsResponse>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client with configuration
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Service liveness and job count
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get(HEALTH_ENDPOINT, "Health check failed").await
    }

    /// All jobs known to the service
    pub async fn list_jobs(&self) -> ClientResult<JobsResponse> {
        self.get(JOBS_ENDPOINT, "Failed to list jobs").await
    }

    /// Results of a job ranked by relevance to the uploaded résumé
    pub async fn rank(&self, job_id: &str, top_k: usize) -> ClientResult<RankResponse> {
        let endpoint = format!("{}/{}?top_k={}", RANK_ENDPOINT, job_id, top_k);
        self.get(&endpoint, "Failed to rank results").await
    }

    /// Generic GET request
    pub async fn get<R>(&self, endpoint: &str, default_error: &str) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = server_message(status, &body, default_error);
            error!("GET {} failed: {}", url, message);
            return Err(ClientError::Poll(message));
        }

        decode(&body)
    }
}

#[async_trait]
impl JobService for ServiceClient {
    async fn process_resume(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> ClientResult<ProcessResumeResponse> {
        let url = format!("{}{}", self.base_url, PROCESS_RESUME_ENDPOINT);

        let form = Form::new().part(
            UPLOAD_FIELD,
            Part::bytes(content)
                .file_name(file_name.to_string())
                .mime_str(PDF_MIME)?,
        );

        info!("Uploading resume {} to {}", file_name, url);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!("Response status: {}", status);

        if !status.is_success() {
            let message = server_message(status, &body, "Failed to process resume");
            error!("Resume upload rejected: {}", message);
            return Err(ClientError::Upload(message));
        }

        upload_outcome(decode(&body)?)
    }

    async fn fetch_results(&self, job_id: &str) -> ClientResult<ResultsResponse> {
        let url = format!("{}{}/{}", self.base_url, RESULTS_ENDPOINT, job_id);
        debug!(job_id = %job_id, "Checking results");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Poll(server_message(
                status,
                &body,
                "Failed to fetch results",
            )));
        }

        decode(&body)
    }
}

/// Accept a 2xx upload body only when it reports success and carries a job id.
fn upload_outcome(parsed: ProcessResumeResponse) -> ClientResult<ProcessResumeResponse> {
    if !parsed.success {
        let message = parsed
            .error
            .or(parsed.detail)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Processing failed".to_string());
        return Err(ClientError::Upload(message));
    }
    if parsed.job_id.as_deref().map_or(true, str::is_empty) {
        return Err(ClientError::Upload(
            "Processing failed: no job id returned".to_string(),
        ));
    }
    Ok(parsed)
}

fn decode<R: DeserializeOwned>(body: &str) -> ClientResult<R> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Message for a non-2xx response: `detail`, then `error`, then `default`.
fn server_message(status: StatusCode, body: &str, default: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string()),
        Err(_) => format!("{} (HTTP {})", default, status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(
                StatusCode::NOT_FOUND,
                r#"{"detail": "Job ID not found"}"#,
                "Failed to fetch results"
            ),
            "Job ID not found"
        );
        assert_eq!(
            server_message(StatusCode::BAD_REQUEST, "{}", "Failed to process resume"),
            "Failed to process resume"
        );
        assert_eq!(
            server_message(
                StatusCode::BAD_GATEWAY,
                "<html>bad gateway</html>",
                "Failed to fetch results"
            ),
            "Failed to fetch results (HTTP 502)"
        );
    }

    fn upload_body(body: &str) -> ClientResult<ProcessResumeResponse> {
        upload_outcome(decode(body)?)
    }

    #[test]
    fn test_upload_outcome_accepts_success_with_job_id() {
        let resp = upload_body(
            r#"{"success": true, "job_id": "3f2a9c1d", "skills": ["rust"],
                "queries": ["rust hiring"], "status": "waiting_for_linkedin"}"#,
        )
        .unwrap();
        assert_eq!(resp.job_id.as_deref(), Some("3f2a9c1d"));
        assert_eq!(resp.skills, vec!["rust"]);
        assert_eq!(resp.queries, vec!["rust hiring"]);
    }

    #[test]
    fn test_upload_outcome_failure_messages() {
        let err = upload_body(r#"{"success": false, "error": "No text in PDF"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Upload(_)));
        assert_eq!(err.to_string(), "No text in PDF");

        let err = upload_body(r#"{"success": false, "detail": "Bad file"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Bad file");

        let err = upload_body(r#"{"success": false}"#).unwrap_err();
        assert_eq!(err.to_string(), "Processing failed");

        let err = upload_body(r#"{"job_id": "abc"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Processing failed");
    }

    #[test]
    fn test_upload_outcome_requires_job_id() {
        for body in [r#"{"success": true}"#, r#"{"success": true, "job_id": ""}"#] {
            let err = upload_body(body).unwrap_err();
            assert_eq!(err.to_string(), "Processing failed: no job id returned");
        }
    }

    #[test]
    fn test_decode_reports_malformed_body() {
        let err = decode::<ResultsResponse>("not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
