//! Cancellable repeating status check for one job.
//!
//! The task checks immediately, then once per interval, and reports every
//! outcome back to the controller over a channel. It never stops on its own:
//! failed checks are reported and the next tick simply tries again, with no
//! retry cap and no backoff. Only the controller stops the task, by
//! cancelling its token.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::JobService;
use crate::error::ClientResult;
use crate::types::response::ResultsResponse;

/// Outcome of one status check, tagged with the job and poll cycle it belongs to.
#[derive(Debug)]
pub struct PollReport {
    pub job_id: String,
    pub generation: u64,
    pub outcome: ClientResult<ResultsResponse>,
}

/// Handle to a running poll task.
pub struct PollTimer {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTimer {
    /// Start polling `job_id`. The first check runs without waiting for the interval.
    pub fn spawn<S: JobService>(
        service: Arc<S>,
        job_id: String,
        generation: u64,
        period: Duration,
        reports: mpsc::UnboundedSender<PollReport>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // A slow check pushes the next one back instead of bunching ticks up.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    outcome = service.fetch_results(&job_id) => outcome,
                };

                if let Err(e) = &outcome {
                    warn!(job_id = %job_id, error = %e, "Polling error");
                }

                let report = PollReport {
                    job_id: job_id.clone(),
                    generation,
                    outcome,
                };
                if reports.send(report).is_err() {
                    break;
                }
            }

            debug!(job_id = %job_id, generation, "Poll task stopped");
        });

        Self {
            generation,
            cancel,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
