use serde::{Deserialize, Serialize};

use crate::domain::{JobId, ResumeId};

pub const RESUME_UPLOAD_PATH: &str = "/api/upload/resume";
pub const JOB_UPLOAD_PATH: &str = "/api/upload/job";
pub const RESUME_LIST_PATH: &str = "/api/upload/resumes";
pub const JOB_LIST_PATH: &str = "/api/upload/jobs";

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying a job description's title.
pub const TITLE_FIELD: &str = "title";

/// Resume as stored by the backend. The upload route only echoes `id` and
/// `filename`, the list route returns every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: ResumeId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
