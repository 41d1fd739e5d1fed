//! Async driver around [`UploadLifecycle`].
//!
//! The session owns the lifecycle and at most one in-flight submission task.
//! Dropping the session aborts that task, so a torn-down dashboard never
//! receives late progress or results.

use std::sync::Arc;

use anyhow::Result;
use shared::{
    error::{Notice, OperationFailure},
    protocol::ResumeRecord,
};
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    upload::{
        AcceptPolicy, SelectedFile, UploadError, UploadLifecycle, UploadPhase, UploadProgress,
        UPLOAD_FAILED_MESSAGE,
    },
    UploadBackend,
};

#[derive(Debug, Clone)]
pub enum UploadEvent {
    PhaseChanged(UploadPhase),
    DragChanged(bool),
    Progress(UploadProgress),
    Notice(Notice),
}

pub struct UploadSession {
    backend: Arc<dyn UploadBackend>,
    lifecycle: Arc<Mutex<UploadLifecycle>>,
    events: broadcast::Sender<UploadEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl UploadSession {
    pub fn new(backend: Arc<dyn UploadBackend>, policy: AcceptPolicy) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            backend,
            lifecycle: Arc::new(Mutex::new(UploadLifecycle::new(policy))),
            events,
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: UploadEvent) {
        let _ = self.events.send(event);
    }

    pub async fn phase(&self) -> UploadPhase {
        self.lifecycle.lock().await.phase().clone()
    }

    pub async fn history(&self) -> Vec<ResumeRecord> {
        self.lifecycle.lock().await.history().to_vec()
    }

    pub async fn selected_file(&self) -> Option<SelectedFile> {
        self.lifecycle.lock().await.selected_file().cloned()
    }

    pub async fn is_drag_active(&self) -> bool {
        self.lifecycle.lock().await.is_drag_active()
    }

    /// Replaces history with the backend's stored resumes.
    pub async fn load_history(&self) -> Result<usize> {
        let records = self.backend.list_resumes().await?;
        let count = records.len();
        self.lifecycle.lock().await.load_history(records);
        Ok(count)
    }

    pub async fn drag_enter(&self) {
        self.lifecycle.lock().await.drag_enter();
        self.emit(UploadEvent::DragChanged(true));
    }

    pub async fn drag_over(&self) {
        self.lifecycle.lock().await.drag_over();
        self.emit(UploadEvent::DragChanged(true));
    }

    pub async fn drag_leave(&self) {
        self.lifecycle.lock().await.drag_leave();
        self.emit(UploadEvent::DragChanged(false));
    }

    pub async fn select_file(&self, file: SelectedFile) -> Result<(), UploadError> {
        let mut guard = self.lifecycle.lock().await;
        let result = guard.select_file(file);
        self.settle(&guard, result)
    }

    pub async fn drop_files(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Result<bool, UploadError> {
        let mut guard = self.lifecycle.lock().await;
        let result = guard.drop_files(files);
        self.emit(UploadEvent::DragChanged(false));
        self.settle(&guard, result)
    }

    pub async fn cancel_selection(&self) -> Result<(), UploadError> {
        let mut guard = self.lifecycle.lock().await;
        let result = guard.cancel_selection();
        self.settle(&guard, result)
    }

    pub async fn retry(&self) -> Result<(), UploadError> {
        let mut guard = self.lifecycle.lock().await;
        let result = guard.retry();
        self.settle(&guard, result)
    }

    fn settle<T>(
        &self,
        lifecycle: &UploadLifecycle,
        result: Result<T, UploadError>,
    ) -> Result<T, UploadError> {
        match &result {
            Ok(_) => self.emit(UploadEvent::PhaseChanged(lifecycle.phase().clone())),
            Err(err) => self.emit(UploadEvent::Notice(err.notice())),
        }
        result
    }

    /// Starts the single submission this session allows at a time.
    pub async fn submit(&mut self) -> Result<(), UploadError> {
        let file = {
            let mut guard = self.lifecycle.lock().await;
            let result = guard.begin_submit();
            self.settle(&guard, result)?
        };

        let backend = Arc::clone(&self.backend);
        let lifecycle = Arc::clone(&self.lifecycle);
        let events = self.events.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let (progress_tx, mut progress_rx) = watch::channel(UploadProgress::Indeterminate);
            let mut upload = backend.upload_resume(&file, progress_tx);
            let mut progress_open = true;
            let outcome = loop {
                tokio::select! {
                    outcome = &mut upload => break outcome,
                    changed = progress_rx.changed(), if progress_open => {
                        if changed.is_err() {
                            progress_open = false;
                            continue;
                        }
                        let update = *progress_rx.borrow_and_update();
                        if lifecycle.lock().await.report_progress(update).is_ok() {
                            let _ = events.send(UploadEvent::Progress(update));
                        }
                    }
                }
            };

            let mut guard = lifecycle.lock().await;
            let (resolution, notice) = match outcome {
                Ok(record) => {
                    info!(
                        resume_id = record.id.0,
                        filename = file.name(),
                        "resume upload succeeded"
                    );
                    (
                        guard.succeed(record),
                        Notice::success(
                            "Resume uploaded successfully!",
                            "Your resume is being processed and will be ready shortly.",
                        ),
                    )
                }
                Err(err) => {
                    warn!(filename = file.name(), error = %err, "resume upload failed");
                    (
                        guard.fail(UPLOAD_FAILED_MESSAGE),
                        Notice::from_failure(&OperationFailure::transport(UPLOAD_FAILED_MESSAGE)),
                    )
                }
            };
            if let Err(err) = resolution {
                warn!(error = %err, "upload resolved outside of submitting phase");
                return;
            }
            let _ = events.send(UploadEvent::PhaseChanged(guard.phase().clone()));
            let _ = events.send(UploadEvent::Notice(notice));
        }));
        Ok(())
    }

    /// Waits for the in-flight submission, if any, to resolve.
    pub async fn wait_until_resolved(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "upload task ended abnormally");
            }
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
