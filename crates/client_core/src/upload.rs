//! Upload lifecycle state machine.
//!
//! `Idle -> FileSelected -> Submitting -> Succeeded | Failed`. A new selection
//! from either terminal state returns to `FileSelected`. The drag flag is
//! tracked alongside the phase and never touches the selection.

use std::sync::Arc;

use shared::{
    error::{Notice, OperationFailure},
    protocol::ResumeRecord,
};
use thiserror::Error;
use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// User-facing message for any transport failure.
pub const UPLOAD_FAILED_MESSAGE: &str = "We couldn't upload your resume. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptPolicy {
    /// PDF and DOCX.
    #[default]
    Documents,
    /// PDF, DOCX and plain text.
    DocumentsAndText,
}

impl AcceptPolicy {
    pub fn accepted_types(self) -> &'static [&'static str] {
        match self {
            AcceptPolicy::Documents => &[PDF_MIME, DOCX_MIME],
            AcceptPolicy::DocumentsAndText => &[PDF_MIME, DOCX_MIME, TEXT_MIME],
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            AcceptPolicy::Documents => "PDF or DOCX",
            AcceptPolicy::DocumentsAndText => "PDF, DOCX or TXT",
        }
    }

    /// Compares the essence of `declared` (parameters such as `charset` are
    /// ignored) against the allow-list.
    pub fn accepts(self, declared: &str) -> bool {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.accepted_types().contains(&essence.as_str())
    }

    pub fn check(self, file: &SelectedFile) -> Result<(), UploadError> {
        if self.accepts(file.mime_type()) {
            Ok(())
        } else {
            Err(UploadError::InvalidFileType {
                declared: file.mime_type().to_string(),
                accepted: self.describe(),
            })
        }
    }
}

/// A file chosen by the user. Cloning shares the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadProgress {
    /// The transport has not reported byte counts.
    #[default]
    Indeterminate,
    Transferred { sent: u64, total: u64 },
}

impl UploadProgress {
    pub fn percent(self) -> Option<u8> {
        match self {
            UploadProgress::Indeterminate => None,
            UploadProgress::Transferred { total: 0, .. } => Some(100),
            UploadProgress::Transferred { sent, total } => {
                Some((sent.min(total) * 100 / total) as u8)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FileSelected {
        file: SelectedFile,
    },
    Submitting {
        file: SelectedFile,
        progress: UploadProgress,
    },
    Succeeded {
        record: ResumeRecord,
    },
    /// The file is kept so the user can retry without choosing it again.
    Failed {
        file: SelectedFile,
        message: String,
    },
}

impl UploadPhase {
    pub fn label(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::FileSelected { .. } => "file_selected",
            UploadPhase::Submitting { .. } => "submitting",
            UploadPhase::Succeeded { .. } => "succeeded",
            UploadPhase::Failed { .. } => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, UploadPhase::Submitting { .. })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported file type `{declared}`; please upload a {accepted} file")]
    InvalidFileType {
        declared: String,
        accepted: &'static str,
    },
    #[error("no file selected; choose a resume before submitting")]
    NothingSelected,
    #[error("an upload is already in progress")]
    AlreadySubmitting,
    #[error("there is no failed upload to retry")]
    NothingToRetry,
    #[error("no upload is in progress")]
    NotSubmitting,
}

impl UploadError {
    /// Only a rejected file is a failed operation. The other variants are
    /// calls made in the wrong phase and have no failure category.
    pub fn to_failure(&self) -> Option<OperationFailure> {
        match self {
            UploadError::InvalidFileType { accepted, .. } => Some(OperationFailure::validation(
                format!("Please upload a {accepted} file"),
            )),
            _ => None,
        }
    }

    pub fn notice(&self) -> Notice {
        match self.to_failure() {
            Some(failure) => Notice::from_failure(&failure),
            None => Notice::info("Upload not started", self.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadLifecycle {
    policy: AcceptPolicy,
    phase: UploadPhase,
    drag_active: bool,
    history: Vec<ResumeRecord>,
}

impl UploadLifecycle {
    pub fn new(policy: AcceptPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.policy
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    /// Prior results, most recent first.
    pub fn history(&self) -> &[ResumeRecord] {
        &self.history
    }

    pub fn load_history(&mut self, records: Vec<ResumeRecord>) {
        self.history = records;
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.phase {
            UploadPhase::FileSelected { file }
            | UploadPhase::Submitting { file, .. }
            | UploadPhase::Failed { file, .. } => Some(file),
            UploadPhase::Idle | UploadPhase::Succeeded { .. } => None,
        }
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Replaces any pending selection. Rejected types leave the phase as it was.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), UploadError> {
        if self.phase.is_submitting() {
            return Err(UploadError::AlreadySubmitting);
        }
        if let Err(err) = self.policy.check(&file) {
            debug!(
                filename = file.name(),
                mime_type = file.mime_type(),
                "rejected file selection"
            );
            return Err(err);
        }
        debug!(filename = file.name(), bytes = file.len(), "file selected");
        self.phase = UploadPhase::FileSelected { file };
        Ok(())
    }

    /// Selects the first dropped file. Returns `Ok(false)` for an empty drop.
    pub fn drop_files(
        &mut self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Result<bool, UploadError> {
        self.drag_active = false;
        match files.into_iter().next() {
            Some(file) => self.select_file(file).map(|()| true),
            None => Ok(false),
        }
    }

    /// Clears a pending selection without submitting it.
    pub fn cancel_selection(&mut self) -> Result<(), UploadError> {
        match self.phase {
            UploadPhase::FileSelected { .. } => {
                self.phase = UploadPhase::Idle;
                Ok(())
            }
            UploadPhase::Submitting { .. } => Err(UploadError::AlreadySubmitting),
            _ => Err(UploadError::NothingSelected),
        }
    }

    /// Moves to `Submitting` and hands back the file to send.
    pub fn begin_submit(&mut self) -> Result<SelectedFile, UploadError> {
        match std::mem::take(&mut self.phase) {
            UploadPhase::FileSelected { file } => {
                self.phase = UploadPhase::Submitting {
                    file: file.clone(),
                    progress: UploadProgress::Indeterminate,
                };
                Ok(file)
            }
            other => {
                let err = if other.is_submitting() {
                    UploadError::AlreadySubmitting
                } else {
                    UploadError::NothingSelected
                };
                self.phase = other;
                Err(err)
            }
        }
    }

    pub fn report_progress(&mut self, update: UploadProgress) -> Result<(), UploadError> {
        match &mut self.phase {
            UploadPhase::Submitting { progress, .. } => {
                *progress = update;
                Ok(())
            }
            _ => Err(UploadError::NotSubmitting),
        }
    }

    /// Records the result first in history and clears the selection.
    pub fn succeed(&mut self, record: ResumeRecord) -> Result<(), UploadError> {
        if !self.phase.is_submitting() {
            return Err(UploadError::NotSubmitting);
        }
        self.history.insert(0, record.clone());
        self.phase = UploadPhase::Succeeded { record };
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), UploadError> {
        match std::mem::take(&mut self.phase) {
            UploadPhase::Submitting { file, .. } => {
                self.phase = UploadPhase::Failed {
                    file,
                    message: message.into(),
                };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(UploadError::NotSubmitting)
            }
        }
    }

    /// Re-arms the retained file after a failure.
    pub fn retry(&mut self) -> Result<(), UploadError> {
        match std::mem::take(&mut self.phase) {
            UploadPhase::Failed { file, .. } => {
                self.phase = UploadPhase::FileSelected { file };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(UploadError::NothingToRetry)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
