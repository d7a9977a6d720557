// src/session/state.rs
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use crate::types::{Job, Notice, ResultPost};

/// Where the session currently is in the upload → poll → results flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Processing,
    AwaitingConfirmation,
    Polling,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Processing => "processing",
            Phase::AwaitingConfirmation => "awaiting_confirmation",
            Phase::Polling => "polling",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// All mutable state of one client session. Owned by the controller.
#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    pub selected_file: Option<PathBuf>,
    pub job: Option<Job>,
    pub skills: Vec<String>,
    pub queries: Vec<String>,
    pub results: Vec<ResultPost>,
    /// Number of queries the completed job reported.
    pub total_queries: usize,
    pub status_text: Option<String>,
    notices: VecDeque<Notice>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            selected_file: None,
            job: None,
            skills: Vec::new(),
            queries: Vec::new(),
            results: Vec::new(),
            total_queries: 0,
            status_text: None,
            notices: VecDeque::new(),
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.job_id.as_str())
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    /// Take every pending notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Drop the job and everything derived from it. Pending notices survive.
    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.selected_file = None;
        self.job = None;
        self.skills.clear();
        self.queries.clear();
        self.results.clear();
        self.total_queries = 0;
        self.status_text = None;
    }
}
