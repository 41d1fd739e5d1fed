mod config;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    uploads_unavailable_notice, AcceptPolicy, BackendClient, FitFilter, OfflineUploadBackend,
    RecruiterDashboard, SelectedFile, SortKey, StaticCandidateRepository, StudentDashboard,
    UploadBackend, UploadEvent, UploadPhase, UploadProgress, View, ViewMode, ViewRouter,
};
use shared::{
    domain::CandidateId,
    error::{Notice, NoticeSeverity},
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "resumematch", about = "Resume and job matching client")]
struct Cli {
    /// Backend base URL; overrides the config file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter, sort and print the candidate list.
    Candidates {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        filter: FitFilter,
        #[arg(long, default_value = "relevance")]
        sort: SortKey,
        #[arg(long, default_value = "table")]
        view: ViewMode,
    },
    /// Request the analysis report for one candidate.
    Report { id: i64 },
    /// Upload a resume and follow it to completion.
    UploadResume {
        path: PathBuf,
        #[arg(long)]
        offline: bool,
        /// Also accept plain text resumes.
        #[arg(long)]
        accept_text: bool,
    },
    /// Upload a job description.
    UploadJob {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        offline: bool,
    },
    /// List stored resumes.
    Resumes,
    /// List stored job descriptions.
    Jobs,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }

    let mut router = ViewRouter::new();
    match cli.command {
        Command::Candidates {
            search,
            filter,
            sort,
            view,
        } => {
            router.navigate(View::Recruiter);
            let mut dashboard = RecruiterDashboard::new(
                Arc::new(StaticCandidateRepository::sample()?),
                backend(&settings, true)?,
            );
            dashboard.set_search(search);
            dashboard.set_filter(filter);
            dashboard.set_sort(sort);
            dashboard.set_view_mode(view);
            println!("{}", dashboard.render());
            Ok(ExitCode::SUCCESS)
        }
        Command::Report { id } => {
            router.navigate(View::Recruiter);
            let dashboard = RecruiterDashboard::new(
                Arc::new(StaticCandidateRepository::sample()?),
                backend(&settings, true)?,
            );
            match dashboard.request_report(CandidateId(id)) {
                Some(notice) => {
                    print_notice(&notice);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("No candidate with id {id}.");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::UploadResume {
            path,
            offline,
            accept_text,
        } => {
            router.navigate(View::Student);
            let policy = if accept_text {
                AcceptPolicy::DocumentsAndText
            } else {
                settings.accept_policy()
            };
            let file = read_selected_file(&path).await?;
            upload_resume(backend(&settings, offline)?, policy, file).await
        }
        Command::UploadJob {
            path,
            title,
            offline,
        } => {
            router.navigate(View::Recruiter);
            let dashboard = RecruiterDashboard::new(
                Arc::new(StaticCandidateRepository::sample()?),
                backend(&settings, offline)?,
            );
            let file = read_selected_file(&path).await?;
            match dashboard.upload_job(file, &title).await {
                Ok(record) => {
                    print_notice(&RecruiterDashboard::job_uploaded_notice(&record));
                    println!("job id: {}", record.id);
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    print_notice(&Notice::from(failure));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Resumes => {
            router.navigate(View::Student);
            Ok(report(show_resumes(backend(&settings, false)?.as_ref()).await))
        }
        Command::Jobs => {
            router.navigate(View::Recruiter);
            Ok(report(show_jobs(backend(&settings, false)?.as_ref()).await))
        }
    }
}

fn report(outcome: Result<(), Notice>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(notice) => {
            print_notice(&notice);
            ExitCode::FAILURE
        }
    }
}

async fn show_resumes(backend: &dyn UploadBackend) -> Result<(), Notice> {
    let records = backend.list_resumes().await.map_err(|err| {
        warn!(error = %err, "failed to list resumes");
        uploads_unavailable_notice()
    })?;
    if records.is_empty() {
        println!("No resumes uploaded yet.");
    }
    for record in records {
        println!(
            "{:>6}  {}  {}",
            record.id,
            record.created_at.as_deref().unwrap_or("-"),
            record.filename
        );
    }
    Ok(())
}

async fn show_jobs(backend: &dyn UploadBackend) -> Result<(), Notice> {
    let records = backend.list_jobs().await.map_err(|err| {
        warn!(error = %err, "failed to list job descriptions");
        uploads_unavailable_notice()
    })?;
    if records.is_empty() {
        println!("No job descriptions uploaded yet.");
    }
    for record in records {
        println!(
            "{:>6}  {}  {}",
            record.id,
            record.title.as_deref().unwrap_or("(untitled)"),
            record.filename.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn backend(settings: &Settings, offline: bool) -> Result<Arc<dyn UploadBackend>> {
    if offline {
        info!("using offline backend");
        return Ok(Arc::new(OfflineUploadBackend::new()));
    }
    let client = BackendClient::with_timeout(&settings.api_base_url, settings.request_timeout())?;
    info!(api = client.base_url(), "using remote backend");
    Ok(Arc::new(client))
}

async fn read_selected_file(path: &Path) -> Result<SelectedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(SelectedFile::new(name, mime.essence_str(), bytes))
}

async fn upload_resume(
    backend: Arc<dyn UploadBackend>,
    policy: AcceptPolicy,
    file: SelectedFile,
) -> Result<ExitCode> {
    let (mut dashboard, load_notice) = StudentDashboard::open(backend, policy).await;
    if let Some(notice) = load_notice {
        print_notice(&notice);
    }
    let printer = tokio::spawn(print_events(dashboard.session().subscribe()));

    let session = dashboard.session_mut();
    session.drag_enter().await;
    let accepted = session.drop_files([file]).await;
    if matches!(accepted, Ok(true)) && session.submit().await.is_ok() {
        session.wait_until_resolved().await;
    }

    let phase = session.phase().await;
    let history = session.history().await;
    drop(dashboard);
    if let Err(err) = printer.await {
        warn!(error = %err, "event printer ended abnormally");
    }

    match phase {
        UploadPhase::Succeeded { record } => {
            println!("resume id: {} ({} on file)", record.id, history.len());
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

async fn print_events(mut events: broadcast::Receiver<UploadEvent>) {
    loop {
        match events.recv().await {
            Ok(UploadEvent::PhaseChanged(phase)) => println!("[{}]", phase.label()),
            Ok(UploadEvent::DragChanged(_)) => {}
            Ok(UploadEvent::Progress(progress)) => print_progress(progress),
            Ok(UploadEvent::Notice(notice)) => print_notice(&notice),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped upload events"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_progress(progress: UploadProgress) {
    match (progress, progress.percent()) {
        (UploadProgress::Transferred { sent, total }, Some(percent)) => {
            println!("  uploading... {percent:>3}% ({sent}/{total} bytes)")
        }
        _ => println!("  uploading..."),
    }
}

fn print_notice(notice: &Notice) {
    let marker = match notice.severity {
        NoticeSeverity::Info => "info",
        NoticeSeverity::Success => "ok",
        NoticeSeverity::Destructive => "error",
    };
    println!("{marker}: {}: {}", notice.title, notice.description);
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
