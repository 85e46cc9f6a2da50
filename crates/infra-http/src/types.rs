//! Status document types
//!
//! Mirrors the subset of Jenkins' `/api/json` we read:
//! `{"jobs": [{"name": "build", "color": "blue"}, ...]}`.

use pivate_core::domain::StatusSnapshot;
use pivate_core::port::FetchError;
use serde::Deserialize;

/// Top-level status document
#[derive(Debug, Clone, Deserialize)]
pub struct JobListDocument {
    pub jobs: Vec<JobEntry>,
}

/// One job of the document
#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    pub name: String,
    /// Absent for folders and other non-buildable items
    #[serde(default)]
    pub color: Option<String>,
}

impl JobListDocument {
    /// Keep every job that reports a color
    pub fn into_snapshot(self) -> StatusSnapshot {
        self.jobs
            .into_iter()
            .filter_map(|job| job.color.map(|color| (job.name, color)))
            .collect()
    }
}

/// Parse a raw response body
///
/// # Errors
/// - `FetchError::Malformed` if the body is not a job list document
pub fn parse_job_list(body: &[u8]) -> Result<StatusSnapshot, FetchError> {
    let document: JobListDocument =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(document.into_snapshot())
}
