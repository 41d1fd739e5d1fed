//! Dashboard state owners and the top-level view router.

use std::{fmt, str::FromStr, sync::Arc};

use shared::{
    domain::{CandidateId, CandidateRecord, ParseKeyError},
    error::{Notice, NoticeSeverity, OperationFailure},
    protocol::JobRecord,
};
use tracing::{info, warn};

use crate::{
    candidates::{CandidateQuery, CandidateRepository, FitFilter, SortKey, ViewMode},
    render,
    session::UploadSession,
    upload::{AcceptPolicy, SelectedFile},
    UploadBackend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Student,
    Recruiter,
}

impl FromStr for View {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" | "home" => Ok(View::Landing),
            "student" => Ok(View::Student),
            "recruiter" => Ok(View::Recruiter),
            _ => Err(ParseKeyError::new("view", s)),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Landing => "landing",
            View::Student => "student",
            View::Recruiter => "recruiter",
        })
    }
}

#[derive(Debug, Default)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// Returns whether the view actually changed.
    pub fn navigate(&mut self, view: View) -> bool {
        if self.current == view {
            return false;
        }
        info!(from = %self.current, to = %view, "switching view");
        self.current = view;
        true
    }
}

/// Shown when stored resumes or job descriptions cannot be fetched.
pub fn uploads_unavailable_notice() -> Notice {
    Notice::new(
        NoticeSeverity::Destructive,
        "Could not load uploads",
        "Your previous uploads are unavailable right now.",
    )
}

/// Student side: one upload session plus the resumes already on file.
pub struct StudentDashboard {
    session: UploadSession,
}

impl StudentDashboard {
    pub fn new(backend: Arc<dyn UploadBackend>, policy: AcceptPolicy) -> Self {
        Self {
            session: UploadSession::new(backend, policy),
        }
    }

    /// Builds the dashboard and loads existing resumes. A failed load leaves
    /// the list empty and comes back as a notice.
    pub async fn open(
        backend: Arc<dyn UploadBackend>,
        policy: AcceptPolicy,
    ) -> (Self, Option<Notice>) {
        let dashboard = Self::new(backend, policy);
        let notice = match dashboard.session.load_history().await {
            Ok(count) => {
                info!(count, "loaded resume history");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to load resume history");
                Some(uploads_unavailable_notice())
            }
        };
        (dashboard, notice)
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut UploadSession {
        &mut self.session
    }
}

/// Recruiter side: candidate analysis and job description uploads.
pub struct RecruiterDashboard {
    repository: Arc<dyn CandidateRepository>,
    backend: Arc<dyn UploadBackend>,
    query: CandidateQuery,
    view_mode: ViewMode,
}

impl RecruiterDashboard {
    pub fn new(repository: Arc<dyn CandidateRepository>, backend: Arc<dyn UploadBackend>) -> Self {
        Self {
            repository,
            backend,
            query: CandidateQuery::default(),
            view_mode: ViewMode::default(),
        }
    }

    pub fn query(&self) -> &CandidateQuery {
        &self.query
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub fn set_filter(&mut self, filter: FitFilter) {
        self.query.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Candidates as currently filtered and ordered.
    pub fn visible(&self) -> Vec<CandidateRecord> {
        self.query.apply(&self.repository.candidates())
    }

    pub fn render(&self) -> String {
        render::render(self.view_mode, &self.visible())
    }

    /// Job descriptions may also be plain text.
    pub async fn upload_job(
        &self,
        file: SelectedFile,
        title: &str,
    ) -> Result<JobRecord, OperationFailure> {
        if let Err(rejected) = AcceptPolicy::DocumentsAndText.check(&file) {
            if let Some(failure) = rejected.to_failure() {
                return Err(failure);
            }
        }
        self.backend.upload_job(&file, title).await.map_err(|err| {
            warn!(filename = file.name(), error = %err, "job description upload failed");
            OperationFailure::transport("We couldn't upload the job description. Please try again.")
        })
    }

    /// Looks the candidate up among all records, not only the visible ones.
    pub fn request_report(&self, id: CandidateId) -> Option<Notice> {
        let candidate = self
            .repository
            .candidates()
            .into_iter()
            .find(|candidate| candidate.id == id)?;
        info!(candidate_id = id.0, "analysis report requested");
        Some(Notice::info(
            "Report downloading",
            format!(
                "Detailed analysis report for {} is being prepared.",
                candidate.name
            ),
        ))
    }

    pub fn job_uploaded_notice(record: &JobRecord) -> Notice {
        let title = record.title.as_deref().unwrap_or("Job description");
        Notice::success(
            "Job description uploaded!",
            format!("{title} is being processed and prepared for candidate matching."),
        )
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
