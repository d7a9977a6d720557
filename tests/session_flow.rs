use async_trait::async_trait;
use job_finder::types::response::{ProcessResumeResponse, ResultsResponse};
use job_finder::types::{JobStatus, ResultPost};
use job_finder::{ClientError, ClientResult, Command, Controller, Effect, JobService, Phase};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Job service that finishes scraping after a fixed number of checks.
struct ScriptedService {
    job_id: String,
    checks_until_done: usize,
    checks: AtomicUsize,
    uploaded_names: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(checks_until_done: usize) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            checks_until_done,
            checks: AtomicUsize::new(0),
            uploaded_names: Mutex::new(Vec::new()),
        }
    }

    fn posts() -> Vec<ResultPost> {
        vec![
            ResultPost {
                author: "Ada".into(),
                query: "rust backend hiring".into(),
                content: "We are hiring <Rust> engineers".into(),
                links: (0..5).map(|i| format!("https://jobs.example/{}", i)).collect(),
                ..Default::default()
            },
            ResultPost {
                author: "Grace".into(),
                query: "tokio remote".into(),
                content: "Remote async role".into(),
                links: vec![],
                ..Default::default()
            },
        ]
    }
}

#[async_trait]
impl JobService for ScriptedService {
    async fn process_resume(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> ClientResult<ProcessResumeResponse> {
        if content.is_empty() {
            return Err(ClientError::Upload("Only PDF files are supported".into()));
        }
        self.uploaded_names
            .lock()
            .unwrap()
            .push(file_name.to_string());
        Ok(ProcessResumeResponse {
            success: true,
            job_id: Some(self.job_id.clone()),
            skills: vec!["rust".into()],
            queries: vec!["rust backend hiring".into(), "tokio remote".into()],
            status: Some(JobStatus::WaitingForLinkedin),
            ..Default::default()
        })
    }

    async fn fetch_results(&self, job_id: &str) -> ClientResult<ResultsResponse> {
        assert_eq!(job_id, self.job_id);
        let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        let done = n >= self.checks_until_done;
        let results = if done { Self::posts() } else { Vec::new() };
        Ok(ResultsResponse {
            status: if done {
                JobStatus::Completed
            } else {
                JobStatus::WaitingForLinkedin
            },
            result_count: Some(results.len()),
            results,
            queries: vec!["rust backend hiring".into(), "tokio remote".into()],
            skills: vec!["rust".into()],
            job_id: Some(job_id.to_string()),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn upload_poll_export_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("Resume.PDF");
    std::fs::write(&resume, b"%PDF-1.7").unwrap();
    let exports = dir.path().join("exports");

    let service = Arc::new(ScriptedService::new(3));
    let mut controller = Controller::new(
        Arc::clone(&service),
        Duration::from_secs(3),
        exports.clone(),
    );

    controller.handle(Command::FileSelected(resume)).await;
    assert_eq!(
        controller.handle(Command::UploadSubmitted).await,
        Effect::Uploaded
    );
    assert_eq!(controller.phase(), Phase::AwaitingConfirmation);
    assert_eq!(controller.session().job_id(), Some(service.job_id.as_str()));
    assert_eq!(*service.uploaded_names.lock().unwrap(), vec!["Resume.PDF"]);

    // Nothing is checked until the user confirms.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(service.checks.load(Ordering::SeqCst), 0);

    controller.handle(Command::ConfirmPolling).await;
    let mut effect = Effect::None;
    while effect != Effect::ResultsReady {
        let report = controller.next_report().await.unwrap();
        effect = controller.handle(Command::PollTick(report)).await;
    }

    assert_eq!(controller.phase(), Phase::Completed);
    assert_eq!(service.checks.load(Ordering::SeqCst), 3);
    assert_eq!(controller.session().results.len(), 2);

    let html = job_finder::render::render_cards(&controller.session().results);
    assert!(html.contains("&lt;Rust&gt;"));
    assert_eq!(html.matches("<a href=").count(), 3);

    let Effect::Exported(path) = controller.handle(Command::ExportRequested).await else {
        panic!("export did not produce a file");
    };
    let expected = format!("linkedin_jobs_{}.json", &service.job_id[..8]);
    assert_eq!(path, exports.join(expected));
    let exported: Vec<ResultPost> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported, ScriptedService::posts());
    assert_eq!(exported[0].links.len(), 5);

    controller.handle(Command::ResetRequested).await;
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.session().job.is_none());
    assert!(controller.session().results.is_empty());

    let messages: Vec<String> = controller
        .drain_notices()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Resume processed successfully!",
            "Found 2 job posts!",
            "Results exported successfully!",
            "Reset complete. Upload a new resume to start.",
        ]
    );
}
