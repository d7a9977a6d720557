// src/session/controller.rs
//! Command-driven state machine for one client session.
//!
//! `Idle → Processing → AwaitingConfirmation → Polling → Completed`, with
//! upload failures routing back to `Idle` and poll failures staying in
//! `Polling`. All state lives in a single [`Session`]; at most one poll task
//! is alive at any time.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::poller::{PollReport, PollTimer};
use super::state::{Phase, Session};
use crate::core::{FsOps, JobService};
use crate::error::ClientError;
use crate::export;
use crate::types::response::ResultsResponse;
use crate::types::{Job, JobStatus, Notice};
use crate::utils::validate_file_extension;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// Inbound commands, one per user action or poll outcome.
#[derive(Debug)]
pub enum Command {
    FileSelected(PathBuf),
    FileCleared,
    UploadSubmitted,
    /// Attach to a job created elsewhere, as if its upload had just succeeded.
    JobAttached(String),
    ConfirmPolling,
    PollTick(PollReport),
    ExportRequested,
    CopyJobId,
    ResetRequested,
}

/// Side effect of a handled command the driver may need to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Uploaded,
    ResultsReady,
    Exported(PathBuf),
    CopiedJobId(String),
}

pub struct Controller<S: JobService> {
    service: Arc<S>,
    session: Session,
    poll_interval: Duration,
    export_dir: PathBuf,
    timer: Option<PollTimer>,
    generation: u64,
    reports_tx: mpsc::UnboundedSender<PollReport>,
    reports_rx: mpsc::UnboundedReceiver<PollReport>,
}

impl<S: JobService> Controller<S> {
    pub fn new(service: Arc<S>, poll_interval: Duration, export_dir: PathBuf) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            service,
            session: Session::new(),
            poll_interval,
            export_dir,
            timer: None,
            generation: 0,
            reports_tx,
            reports_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.session.drain_notices()
    }

    /// True while a poll task is running and has not been cancelled.
    pub fn is_polling(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|t| !t.is_cancelled() && !t.is_finished())
    }

    /// Wait for the next poll report. Pending forever when nothing is polling.
    pub async fn next_report(&mut self) -> Option<PollReport> {
        self.reports_rx.recv().await
    }

    pub async fn handle(&mut self, command: Command) -> Effect {
        debug!(phase = %self.session.phase, ?command, "Handling command");
        match command {
            Command::FileSelected(path) => self.select_file(path),
            Command::FileCleared => {
                self.session.selected_file = None;
                Effect::None
            }
            Command::UploadSubmitted => self.upload().await,
            Command::JobAttached(job_id) => self.attach(job_id),
            Command::ConfirmPolling => self.start_polling(),
            Command::PollTick(report) => self.apply_report(report),
            Command::ExportRequested => self.export().await,
            Command::CopyJobId => self.copy_job_id(),
            Command::ResetRequested => self.reset(),
        }
    }

    fn select_file(&mut self, path: PathBuf) -> Effect {
        let name = file_name(&path);
        match validate_file_extension(&name, ALLOWED_EXTENSIONS) {
            Ok(()) => {
                info!("Selected resume: {}", name);
                self.session.selected_file = Some(path);
            }
            Err(e) => self.session.notify(Notice::error(e.to_string())),
        }
        Effect::None
    }

    async fn upload(&mut self) -> Effect {
        let Some(path) = self.session.selected_file.clone() else {
            self.session
                .notify(Notice::error("Please select a file first"));
            return Effect::None;
        };

        // A new upload starts a new job: the previous one's timer and results go.
        self.stop_timer();
        self.generation += 1;
        self.session.clear();
        self.session.selected_file = Some(path.clone());

        self.session.phase = Phase::Processing;
        self.session.status_text = Some("Uploading and analyzing resume...".to_string());

        let outcome = match FsOps::read_bytes(&path).await {
            Ok(content) => self.service.process_resume(&file_name(&path), content).await,
            Err(e) => Err(ClientError::Upload(format!("{:#}", e))),
        };

        match outcome {
            Ok(response) => {
                let job_id = response.job_id.unwrap_or_default();
                let status = response.status.unwrap_or(JobStatus::WaitingForLinkedin);
                info!(job_id = %job_id, skills = response.skills.len(), queries = response.queries.len(), "Resume processed");

                self.session.job = Some(Job::new(job_id, status));
                self.session.skills = response.skills;
                self.session.queries = response.queries;
                self.session.status_text = None;
                self.session.phase = Phase::AwaitingConfirmation;
                self.session
                    .notify(Notice::success("Resume processed successfully!"));
                Effect::Uploaded
            }
            Err(e) => {
                error!("Resume upload failed: {}", e);
                self.session.selected_file = None;
                self.session.status_text = None;
                self.session.phase = Phase::Idle;
                self.session.notify(Notice::error(e.to_string()));
                Effect::None
            }
        }
    }

    fn attach(&mut self, job_id: String) -> Effect {
        self.stop_timer();
        self.session.clear();
        info!(job_id = %job_id, "Attached to existing job");
        self.session.job = Some(Job::new(job_id, JobStatus::WaitingForLinkedin));
        self.session.phase = Phase::AwaitingConfirmation;
        Effect::None
    }

    fn start_polling(&mut self) -> Effect {
        if !matches!(
            self.session.phase,
            Phase::AwaitingConfirmation | Phase::Polling
        ) {
            warn!(phase = %self.session.phase, "Ignoring poll confirmation");
            return Effect::None;
        }
        let Some(job_id) = self.session.job_id().map(str::to_string) else {
            return Effect::None;
        };

        self.stop_timer();
        self.generation += 1;

        self.session.phase = Phase::Polling;
        self.session.status_text = Some("Checking for results...".to_string());
        if let Some(job) = self.session.job.as_mut() {
            job.status = JobStatus::Polling;
        }

        info!(job_id = %job_id, generation = self.generation, "Polling started");
        self.timer = Some(PollTimer::spawn(
            Arc::clone(&self.service),
            job_id,
            self.generation,
            self.poll_interval,
            self.reports_tx.clone(),
        ));
        Effect::None
    }

    fn apply_report(&mut self, report: PollReport) -> Effect {
        if self.session.phase != Phase::Polling
            || report.generation != self.generation
            || self.session.job_id() != Some(report.job_id.as_str())
        {
            debug!(job_id = %report.job_id, generation = report.generation, "Discarding stale poll report");
            return Effect::None;
        }

        match report.outcome {
            Ok(response) => self.apply_results(response),
            Err(e) => {
                self.session.status_text = Some(format!("Error: {}", e));
                Effect::None
            }
        }
    }

    fn apply_results(&mut self, response: ResultsResponse) -> Effect {
        let count = response.count();

        if response.is_complete() {
            self.stop_timer();
            if let Some(job) = self.session.job.as_mut() {
                job.status = JobStatus::Completed;
            }
            self.session.results = response.results;
            self.session.total_queries = response.queries.len();
            self.session.status_text = None;
            self.session.phase = Phase::Completed;
            self.session
                .notify(Notice::success(format!("Found {} job posts!", count)));
            info!(count, "Job completed");
            return Effect::ResultsReady;
        }

        self.session.status_text = Some(match response.status {
            JobStatus::WaitingForLinkedin => {
                format!("Waiting for scraper... ({} posts so far)", count)
            }
            _ => format!("Polling... ({} posts collected)", count),
        });
        Effect::None
    }

    async fn export(&mut self) -> Effect {
        let job_id = self.session.job_id().unwrap_or_default().to_string();
        match export::export_results(&self.session.results, &job_id, &self.export_dir).await {
            Ok(path) => {
                self.session
                    .notify(Notice::success("Results exported successfully!"));
                Effect::Exported(path)
            }
            Err(e) => {
                self.session.notify(Notice::error(e.to_string()));
                Effect::None
            }
        }
    }

    fn copy_job_id(&mut self) -> Effect {
        match self.session.job_id().map(str::to_string) {
            Some(job_id) => {
                self.session
                    .notify(Notice::success("Job ID copied to clipboard!"));
                Effect::CopiedJobId(job_id)
            }
            None => {
                self.session.notify(Notice::error("Failed to copy Job ID"));
                Effect::None
            }
        }
    }

    fn reset(&mut self) -> Effect {
        self.stop_timer();
        // Anything still in flight from the old cycle must not match.
        self.generation += 1;
        self.session.clear();
        self.session.notify(Notice::success(
            "Reset complete. Upload a new resume to start.",
        ));
        info!("Session reset");
        Effect::None
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(generation = timer.generation(), "Cancelling poll task");
            timer.cancel();
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
