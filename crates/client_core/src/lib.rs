use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{JobId, ResumeId},
    protocol::{JobRecord, ResumeRecord},
};
use tokio::sync::watch;
use tracing::info;

pub mod candidates;
pub mod dashboard;
pub mod http;
pub mod render;
pub mod session;
pub mod upload;

pub use candidates::{
    CandidateQuery, CandidateRepository, FitFilter, SortKey, StaticCandidateRepository, ViewMode,
};
pub use dashboard::{
    uploads_unavailable_notice, RecruiterDashboard, StudentDashboard, View, ViewRouter,
};
pub use http::BackendClient;
pub use session::{UploadEvent, UploadSession};
pub use upload::{
    AcceptPolicy, SelectedFile, UploadError, UploadLifecycle, UploadPhase, UploadProgress,
};

/// Default backend address when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Remote side of both dashboards.
///
/// Implementations make exactly one attempt per call; retries are a user
/// decision made through the upload lifecycle.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Sends one resume. Byte-level progress, when the implementation can
    /// observe it, is published on `progress`.
    async fn upload_resume(
        &self,
        file: &SelectedFile,
        progress: watch::Sender<UploadProgress>,
    ) -> Result<ResumeRecord>;
    async fn list_resumes(&self) -> Result<Vec<ResumeRecord>>;
    async fn upload_job(&self, file: &SelectedFile, title: &str) -> Result<JobRecord>;
    async fn list_jobs(&self) -> Result<Vec<JobRecord>>;
}

/// Backend that never touches the network. Uploads resolve immediately with
/// locally assigned ids and progress stays indeterminate.
#[derive(Debug)]
pub struct OfflineUploadBackend {
    next_id: AtomicI64,
}

impl OfflineUploadBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for OfflineUploadBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn extracted_text(file: &SelectedFile) -> String {
    if file.mime_type().starts_with("text/") {
        String::from_utf8_lossy(file.bytes()).into_owned()
    } else {
        String::new()
    }
}

#[async_trait]
impl UploadBackend for OfflineUploadBackend {
    async fn upload_resume(
        &self,
        file: &SelectedFile,
        _progress: watch::Sender<UploadProgress>,
    ) -> Result<ResumeRecord> {
        let record = ResumeRecord {
            id: ResumeId(self.allocate_id()),
            filename: file.name().to_string(),
            text: extracted_text(file),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        info!(resume_id = record.id.0, filename = file.name(), "stored resume offline");
        Ok(record)
    }

    async fn list_resumes(&self) -> Result<Vec<ResumeRecord>> {
        Ok(Vec::new())
    }

    async fn upload_job(&self, file: &SelectedFile, title: &str) -> Result<JobRecord> {
        let record = JobRecord {
            id: JobId(self.allocate_id()),
            title: Some(title.to_string()),
            filename: Some(file.name().to_string()),
            text: Some(extracted_text(file)),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        info!(job_id = record.id.0, title, "stored job description offline");
        Ok(record)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
