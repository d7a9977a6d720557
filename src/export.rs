// src/export.rs
//! JSON export of the results currently held by a session

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::FsOps;
use crate::error::{ClientError, ClientResult};
use crate::types::response::ResultsResponse;
use crate::types::ResultPost;
use crate::utils::short_job_id;

pub fn export_file_name(job_id: &str) -> String {
    format!("linkedin_jobs_{}.json", short_job_id(job_id))
}

pub fn response_file_name(job_id: &str) -> String {
    format!("results_{}.json", short_job_id(job_id))
}

/// Pretty-printed JSON array of the full, untruncated posts.
pub fn results_document(results: &[ResultPost]) -> ClientResult<String> {
    if results.is_empty() {
        return Err(ClientError::Export("No results to export".to_string()));
    }
    to_pretty(results)
}

/// Write `results` to `<dir>/linkedin_jobs_<first8>.json`.
pub async fn export_results(
    results: &[ResultPost],
    job_id: &str,
    dir: &Path,
) -> ClientResult<PathBuf> {
    let document = results_document(results)?;
    let path = dir.join(export_file_name(job_id));
    write(&path, &document).await?;

    info!(job_id = %job_id, count = results.len(), "Exported results to {}", path.display());
    Ok(path)
}

/// Write a whole results response to `<dir>/results_<first8>.json`.
pub async fn save_response(
    response: &ResultsResponse,
    job_id: &str,
    dir: &Path,
) -> ClientResult<PathBuf> {
    let document = to_pretty(response)?;
    let path = dir.join(response_file_name(job_id));
    write(&path, &document).await?;
    Ok(path)
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ClientError::Export(e.to_string()))
}

async fn write(path: &Path, document: &str) -> ClientResult<()> {
    FsOps::write_file_safe(path, document)
        .await
        .map_err(|e| ClientError::Export(format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author: &str, links: usize) -> ResultPost {
        ResultPost {
            author: author.to_string(),
            query: "rust jobs".to_string(),
            content: "x".repeat(500),
            links: (0..links)
                .map(|i| format!("https://example.com/{}/{}", i, "p".repeat(80)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            export_file_name("3f2a9c1d-aaaa-bbbb-cccc-123456789012"),
            "linkedin_jobs_3f2a9c1d.json"
        );
        assert_eq!(response_file_name("abc"), "results_abc.json");
    }

    #[test]
    fn test_empty_export_rejected() {
        let err = results_document(&[]).unwrap_err();
        assert_eq!(err.to_string(), "No results to export");
    }

    #[tokio::test]
    async fn test_export_is_untruncated() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![post("Ada", 5), post("Grace", 0)];

        let path = export_results(&results, "0123456789", dir.path())
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "linkedin_jobs_01234567.json");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  {"));
        let parsed: Vec<ResultPost> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, results);
        assert_eq!(parsed[0].links.len(), 5);
        assert_eq!(parsed[0].content.len(), 500);
    }
}
