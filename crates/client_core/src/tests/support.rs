//! Fakes shared by the unit tests: an in-process backend server and a
//! scripted `UploadBackend`.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{JobId, ResumeId},
    protocol::{
        JobRecord, ResumeRecord, JOB_LIST_PATH, JOB_UPLOAD_PATH, RESUME_LIST_PATH,
        RESUME_UPLOAD_PATH,
    },
};
use tokio::{
    net::TcpListener,
    sync::{watch, Mutex, Notify},
};

use crate::{
    upload::{SelectedFile, UploadProgress},
    UploadBackend,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct MockServer {
    pub resume_status: StatusCode,
    pub received: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
    pub upload_calls: Arc<AtomicUsize>,
}

impl MockServer {
    pub fn ok() -> Self {
        Self::with_resume_status(StatusCode::OK)
    }

    pub fn with_resume_status(resume_status: StatusCode) -> Self {
        Self {
            resume_status,
            received: Arc::new(Mutex::new(Vec::new())),
            upload_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Vec<ReceivedPart> {
        self.received.lock().await.last().cloned().unwrap_or_default()
    }
}

async fn collect_parts(mut multipart: Multipart) -> Vec<ReceivedPart> {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    parts
}

async fn handle_resume_upload(State(state): State<MockServer>, multipart: Multipart) -> Response {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);
    let parts = collect_parts(multipart).await;
    state.received.lock().await.push(parts);
    if !state.resume_status.is_success() {
        return (state.resume_status, Json(json!({"detail": "storage offline"}))).into_response();
    }
    Json(json!({
        "id": 7,
        "filename": "r.pdf",
        "text": "...",
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn handle_job_upload(State(state): State<MockServer>, multipart: Multipart) -> Json<Value> {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);
    let parts = collect_parts(multipart).await;
    let title = parts
        .iter()
        .find(|part| part.name == "title")
        .map(|part| String::from_utf8_lossy(&part.data).into_owned());
    state.received.lock().await.push(parts);
    Json(json!({"id": 21, "title": title, "filename": "jd.pdf"}))
}

async fn handle_list_resumes() -> Json<Value> {
    Json(json!([
        {"id": 2, "filename": "old.pdf", "text": "older", "created_at": "2023-12-01T10:00:00Z"},
        {"id": 1, "filename": "first.pdf", "text": "oldest", "created_at": "2023-11-01T10:00:00Z"}
    ]))
}

async fn handle_list_jobs() -> Json<Value> {
    Json(json!([
        {"id": 4, "title": "Data Scientist", "text": "python", "created_at": "2024-01-18T09:00:00Z"}
    ]))
}

pub async fn spawn_backend_server(state: MockServer) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route(RESUME_UPLOAD_PATH, post(handle_resume_upload))
        .route(JOB_UPLOAD_PATH, post(handle_job_upload))
        .route(RESUME_LIST_PATH, get(handle_list_resumes))
        .route(JOB_LIST_PATH, get(handle_list_jobs))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Address nothing listens on.
pub async fn unreachable_base_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

pub fn resume(id: i64, filename: &str) -> ResumeRecord {
    ResumeRecord {
        id: ResumeId(id),
        filename: filename.to_string(),
        text: String::new(),
        created_at: None,
    }
}

pub fn pdf(name: &str) -> SelectedFile {
    SelectedFile::new(name, crate::upload::PDF_MIME, b"%PDF-1.7 resume".to_vec())
}

/// Backend whose uploads resolve as scripted. With a gate, each upload waits
/// for `release` before resolving.
pub struct ScriptedBackend {
    pub outcome: std::result::Result<ResumeRecord, String>,
    pub progress: Vec<UploadProgress>,
    pub history: std::result::Result<Vec<ResumeRecord>, String>,
    pub gate: Option<Arc<Notify>>,
    pub started: Arc<Notify>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn succeeding(record: ResumeRecord) -> Self {
        Self {
            outcome: Ok(record),
            progress: Vec::new(),
            history: Ok(Vec::new()),
            gate: None,
            started: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let mut backend = Self::succeeding(resume(0, "unused"));
        backend.outcome = Err(message.to_string());
        backend
    }

    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl UploadBackend for ScriptedBackend {
    async fn upload_resume(
        &self,
        _file: &SelectedFile,
        progress: watch::Sender<UploadProgress>,
    ) -> Result<ResumeRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        for update in &self.progress {
            let _ = progress.send(*update);
            tokio::task::yield_now().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone().map_err(|message| anyhow!(message))
    }

    async fn list_resumes(&self) -> Result<Vec<ResumeRecord>> {
        self.history.clone().map_err(|message| anyhow!(message))
    }

    async fn upload_job(&self, file: &SelectedFile, title: &str) -> Result<JobRecord> {
        Ok(JobRecord {
            id: JobId(99),
            title: Some(title.to_string()),
            filename: Some(file.name().to_string()),
            text: None,
            created_at: None,
        })
    }

    async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        Ok(Vec::new())
    }
}
