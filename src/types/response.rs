use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::job::{JobStatus, ResultPost};

// ===== Job Service Response Types =====

/// Body of `POST /process-resume`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessResumeResponse {
    pub success: bool,
    pub job_id: Option<String>,
    pub skills: Vec<String>,
    pub queries: Vec<String>,
    pub status: Option<JobStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

/// Error body shape shared by every endpoint on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// Server-supplied message, preferring `detail` over `error`.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.is_empty())
    }
}

/// Body of `GET /results/{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub result_count: Option<usize>,
    #[serde(default)]
    pub results: Vec<ResultPost>,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

impl ResultsResponse {
    /// Reported result count, falling back to the number of results carried.
    pub fn count(&self) -> usize {
        self.result_count.unwrap_or(self.results.len())
    }

    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Completed && self.count() > 0
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub jobs_count: usize,
    pub llm_backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub status: JobStatus,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub result_count: usize,
}

/// Body of `GET /jobs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsResponse {
    pub success: bool,
    pub total_jobs: usize,
    pub jobs: BTreeMap<String, JobSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPost {
    #[serde(default)]
    pub score: f64,
    #[serde(flatten)]
    pub post: ResultPost,
}

/// Body of `GET /rank/{job_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankResponse {
    pub success: bool,
    pub ranked_results: Vec<RankedPost>,
    pub count: usize,
}
