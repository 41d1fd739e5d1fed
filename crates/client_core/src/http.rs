//! HTTP client for the resume backend.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{
    multipart::{Form, Part},
    Body, Client,
};
use shared::protocol::{
    JobRecord, ResumeRecord, FILE_FIELD, JOB_LIST_PATH, JOB_UPLOAD_PATH, RESUME_LIST_PATH,
    RESUME_UPLOAD_PATH, TITLE_FIELD,
};
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

use crate::{
    upload::{SelectedFile, UploadProgress},
    UploadBackend,
};

/// Size of the slices the request body is fed to the transport in.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: Client) -> Result<Self> {
        let parsed =
            Url::parse(base_url.trim()).with_context(|| format!("invalid api url `{base_url}`"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "api url must use http or https, got `{}`",
                parsed.scheme()
            ));
        }
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn upload_resume(
        &self,
        file: &SelectedFile,
        progress: Option<watch::Sender<UploadProgress>>,
    ) -> Result<ResumeRecord> {
        let form = Form::new().part(FILE_FIELD, streamed_part(file, progress)?);
        info!(filename = file.name(), bytes = file.len(), "uploading resume");
        let record: ResumeRecord = self
            .http
            .post(self.endpoint(RESUME_UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(resume_id = record.id.0, "resume stored");
        Ok(record)
    }

    pub async fn upload_job(&self, file: &SelectedFile, title: &str) -> Result<JobRecord> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .with_context(|| format!("invalid mime type `{}`", file.mime_type()))?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(TITLE_FIELD, title.to_string());
        info!(filename = file.name(), title, "uploading job description");
        let record: JobRecord = self
            .http
            .post(self.endpoint(JOB_UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(job_id = record.id.0, "job description stored");
        Ok(record)
    }

    pub async fn list_resumes(&self) -> Result<Vec<ResumeRecord>> {
        let records: Vec<ResumeRecord> = self
            .http
            .get(self.endpoint(RESUME_LIST_PATH))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = records.len(), "fetched resumes");
        Ok(records)
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        let records: Vec<JobRecord> = self
            .http
            .get(self.endpoint(JOB_LIST_PATH))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = records.len(), "fetched jobs");
        Ok(records)
    }
}

// Progress counts bytes handed to the transport, one chunk at a time.
fn streamed_part(
    file: &SelectedFile,
    progress: Option<watch::Sender<UploadProgress>>,
) -> Result<Part> {
    let total = file.len() as u64;
    let chunks: Vec<Vec<u8>> = file
        .bytes()
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(<[u8]>::to_vec)
        .collect();
    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(progress) = &progress {
            let _ = progress.send(UploadProgress::Transferred { sent, total });
        }
        Ok::<_, std::io::Error>(chunk)
    });

    Part::stream_with_length(Body::wrap_stream(stream), total)
        .file_name(file.name().to_string())
        .mime_str(file.mime_type())
        .with_context(|| format!("invalid mime type `{}`", file.mime_type()))
}

#[async_trait]
impl UploadBackend for BackendClient {
    async fn upload_resume(
        &self,
        file: &SelectedFile,
        progress: watch::Sender<UploadProgress>,
    ) -> Result<ResumeRecord> {
        BackendClient::upload_resume(self, file, Some(progress)).await
    }

    async fn list_resumes(&self) -> Result<Vec<ResumeRecord>> {
        BackendClient::list_resumes(self).await
    }

    async fn upload_job(&self, file: &SelectedFile, title: &str) -> Result<JobRecord> {
        BackendClient::upload_job(self, file, title).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        BackendClient::list_jobs(self).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
