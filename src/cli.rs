// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use crate::core::{ConfigManager, FsOps, JobService, ServiceClient};
use crate::render;
use crate::session::{Command, Controller, Effect, Phase};
use crate::types::JobStatus;
use crate::{connect, export};

#[derive(Parser)]
#[command(name = "job-finder")]
#[command(about = "Upload a resume, follow the LinkedIn scraping job and browse its results")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Base URL of the job service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory exported result files are written to
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Upload a resume and follow the job until results arrive
    Run {
        resume: PathBuf,
        /// Also write the results page as HTML
        #[arg(long)]
        html: Option<PathBuf>,
        /// Start polling without waiting for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Follow an existing job until results arrive
    Watch {
        job_id: String,
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Show the current state of a job once
    View {
        job_id: String,
        /// Save the full response as results_<id>.json
        #[arg(long)]
        save: bool,
    },
    /// Rank a job's results by relevance to the resume
    Rank {
        job_id: String,
        #[arg(long, default_value_t = 20)]
        top_k: usize,
    },
    /// List all jobs known to the service
    Jobs,
    /// Check that the job service is up
    Health,
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command {
        CliCommand::Run { resume, html, yes } => {
            let mut driver = Driver::new(connect(&config)?, html);
            driver.run(resume, yes).await
        }
        CliCommand::Watch { job_id, html } => {
            let mut driver = Driver::new(connect(&config)?, html);
            driver.watch(job_id).await
        }
        CliCommand::View { job_id, save } => {
            let client = ServiceClient::new(&config.service)?;
            view_job(&client, &job_id, save.then_some(config.environment.export_dir.as_path()))
                .await
        }
        CliCommand::Rank { job_id, top_k } => {
            let client = ServiceClient::new(&config.service)?;
            rank_job(&client, &job_id, top_k).await
        }
        CliCommand::Jobs => {
            let client = ServiceClient::new(&config.service)?;
            list_jobs(&client).await
        }
        CliCommand::Health => {
            let client = ServiceClient::new(&config.service)?;
            let health = client.health().await?;
            println!("✅ {} ({})", health.message, health.status);
            println!("   Jobs: {}", health.jobs_count);
            println!("   LLM backend: {}", health.llm_backend);
            Ok(())
        }
    }
}

/// Interactive session on the terminal: stdin lines stand in for button clicks.
struct Driver<S: JobService, R = BufReader<Stdin>> {
    controller: Controller<S>,
    lines: Lines<R>,
    stdin_open: bool,
    html: Option<PathBuf>,
    last_status: Option<String>,
}

enum Next {
    NewResume(PathBuf),
    Quit,
}

impl<S: JobService> Driver<S> {
    fn new(controller: Controller<S>, html: Option<PathBuf>) -> Self {
        Driver::with_input(controller, BufReader::new(tokio::io::stdin()), html)
    }
}

impl<S: JobService, R: AsyncBufRead + Unpin> Driver<S, R> {
    fn with_input(controller: Controller<S>, input: R, html: Option<PathBuf>) -> Self {
        Self {
            controller,
            lines: input.lines(),
            stdin_open: true,
            html,
            last_status: None,
        }
    }

    async fn run(&mut self, resume: PathBuf, auto_confirm: bool) -> Result<()> {
        let mut resume = resume;
        loop {
            match self.session_for(resume, auto_confirm).await? {
                Next::NewResume(path) => resume = path,
                Next::Quit => return Ok(()),
            }
        }
    }

    async fn watch(&mut self, job_id: String) -> Result<()> {
        self.controller.handle(Command::JobAttached(job_id)).await;
        self.controller.handle(Command::ConfirmPolling).await;
        self.flush();
        match self.follow().await? {
            Next::NewResume(path) => self.run(path, false).await,
            Next::Quit => Ok(()),
        }
    }

    async fn session_for(&mut self, resume: PathBuf, auto_confirm: bool) -> Result<Next> {
        self.controller.handle(Command::FileSelected(resume)).await;
        self.flush();
        if self.controller.session().selected_file.is_none() {
            return self.ask_for_resume().await;
        }

        println!("⏳ Uploading and analyzing resume...");
        self.controller.handle(Command::UploadSubmitted).await;
        self.flush();
        if self.controller.phase() != Phase::AwaitingConfirmation {
            return self.ask_for_resume().await;
        }

        self.print_skills_and_queries();

        if !auto_confirm && !self.await_confirmation().await? {
            return Ok(Next::Quit);
        }

        self.controller.handle(Command::ConfirmPolling).await;
        self.flush();
        self.follow().await
    }

    fn print_skills_and_queries(&self) {
        let session = self.controller.session();
        println!();
        println!("🆔 Job ID: {}", session.job_id().unwrap_or_default());
        println!(
            "{}",
            render::format_tags("🧠 Skills", &session.skills, "No skills detected")
        );
        println!(
            "{}",
            render::format_tags("🔍 Queries", &session.queries, "No queries generated")
        );
        println!();
    }

    /// Returns false when the user quits instead of confirming.
    async fn await_confirmation(&mut self) -> Result<bool> {
        println!("Start the local scraping agent with this Job ID, then press Enter to check for results.");
        println!("(c = copy job id, q = quit)");
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(true);
            };
            match line.as_str() {
                "q" | "quit" => return Ok(false),
                "c" | "copy" => self.copy_job_id().await,
                _ => return Ok(true),
            }
        }
    }

    /// Poll until results arrive, the user resets, or the user quits.
    async fn follow(&mut self) -> Result<Next> {
        println!("Waiting for results (r = reset, c = copy job id, q = quit)");
        loop {
            tokio::select! {
                Some(report) = self.controller.next_report() => {
                    let effect = self.controller.handle(Command::PollTick(report)).await;
                    self.flush();
                    if effect == Effect::ResultsReady {
                        return self.on_results().await;
                    }
                }
                line = self.lines.next_line(), if self.stdin_open => {
                    match line.context("Failed to read stdin")? {
                        None => self.stdin_open = false,
                        Some(line) => match line.trim() {
                            "r" | "reset" => return self.reset().await,
                            "c" | "copy" => self.copy_job_id().await,
                            "q" | "quit" => return Ok(Next::Quit),
                            _ => {}
                        },
                    }
                }
            }
        }
    }

    async fn on_results(&mut self) -> Result<Next> {
        let session = self.controller.session();
        println!();
        println!(
            "📝 {} posts from {} queries",
            session.results.len(),
            session.total_queries
        );
        for (idx, post) in session.results.iter().enumerate() {
            println!(
                "{}",
                render::format_post(idx + 1, post, render::TERMINAL_CONTENT_CHARS)
            );
        }

        if let Some(path) = &self.html {
            let page = render::render_page(
                session.job_id().unwrap_or_default(),
                &session.results,
                session.total_queries,
            );
            match FsOps::write_file_safe(path, &page).await {
                Ok(()) => println!("🌐 Results page written to {}", path.display()),
                Err(e) => println!("❌ Failed to write results page: {:#}", e),
            }
        }

        println!("(e = export, r = reset, q = quit)");
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(Next::Quit);
            };
            match line.as_str() {
                "e" | "export" => {
                    if let Effect::Exported(path) =
                        self.controller.handle(Command::ExportRequested).await
                    {
                        println!("💾 {}", path.display());
                    }
                    self.flush();
                }
                "r" | "reset" => return self.reset().await,
                "q" | "quit" => return Ok(Next::Quit),
                _ => {}
            }
        }
    }

    async fn reset(&mut self) -> Result<Next> {
        self.controller.handle(Command::ResetRequested).await;
        self.last_status = None;
        self.flush();
        self.ask_for_resume().await
    }

    async fn ask_for_resume(&mut self) -> Result<Next> {
        println!("Enter the path of a resume to upload (or q to quit):");
        loop {
            match self.read_line().await? {
                None => return Ok(Next::Quit),
                Some(line) if line == "q" || line == "quit" => return Ok(Next::Quit),
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(Next::NewResume(PathBuf::from(line))),
            }
        }
    }

    async fn copy_job_id(&mut self) {
        if let Effect::CopiedJobId(job_id) = self.controller.handle(Command::CopyJobId).await {
            println!("{}", job_id);
        }
        self.flush();
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        if !self.stdin_open {
            return Ok(None);
        }
        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read stdin")?;
        if line.is_none() {
            self.stdin_open = false;
        }
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Print pending notices and any status text change.
    fn flush(&mut self) {
        for notice in self.controller.drain_notices() {
            println!("{}", notice);
        }
        let status = self.controller.session().status_text.clone();
        if status != self.last_status {
            if let Some(text) = &status {
                println!("   {}", text);
            }
            self.last_status = status;
        }
    }
}

async fn view_job(client: &ServiceClient, job_id: &str, save_dir: Option<&Path>) -> Result<()> {
    println!("\n🔍 Fetching results for job_id: {}\n", job_id);
    let response = client.fetch_results(job_id).await?;

    print!("{}", render::format_status_banner(&response));

    if response.status == JobStatus::WaitingForLinkedin {
        println!("⏳ Waiting for LinkedIn scraping to complete...");
        println!("   Run the local agent with this job id to scrape LinkedIn posts");
        return Ok(());
    }

    if response.results.is_empty() {
        println!("❌ No results yet");
        return Ok(());
    }

    for (idx, post) in response.results.iter().enumerate() {
        println!(
            "\n{}",
            render::format_post(idx + 1, post, render::TERMINAL_CONTENT_CHARS)
        );
    }

    if let Some(dir) = save_dir {
        let path = export::save_response(&response, job_id, dir).await?;
        println!("✅ Saved to {}", path.display());
    }
    Ok(())
}

async fn rank_job(client: &ServiceClient, job_id: &str, top_k: usize) -> Result<()> {
    let ranked = client.rank(job_id, top_k).await?;
    info!(job_id = %job_id, count = ranked.count, "Ranked results");

    println!("\n🎯 Top {} posts by relevance\n", ranked.count);
    for (idx, entry) in ranked.ranked_results.iter().enumerate() {
        println!("⭐ Score: {:.3}", entry.score);
        println!(
            "{}",
            render::format_post(idx + 1, &entry.post, render::TERMINAL_CONTENT_CHARS)
        );
    }
    Ok(())
}

async fn list_jobs(client: &ServiceClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    println!("\n📋 Total Jobs: {}\n", jobs.total_jobs);
    println!("{}", "=".repeat(70));
    for (job_id, job) in &jobs.jobs {
        let marker = if job.status == JobStatus::Completed {
            "✅"
        } else {
            "⏳"
        };
        let skills: Vec<&str> = job.skills.iter().take(5).map(String::as_str).collect();

        println!("\n{} Job ID: {}", marker, job_id);
        println!("   Status: {}", job.status);
        println!("   Results: {} posts", job.result_count);
        println!("   Skills: {}", skills.join(", "));
    }
    println!("\n{}", "=".repeat(70));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use crate::types::response::{ProcessResumeResponse, ResultsResponse};
    use crate::types::ResultPost;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingService {
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl JobService for CountingService {
        async fn process_resume(
            &self,
            _file_name: &str,
            _content: Vec<u8>,
        ) -> ClientResult<ProcessResumeResponse> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Upload("Processing failed".into()))
        }

        async fn fetch_results(&self, _job_id: &str) -> ClientResult<ResultsResponse> {
            Ok(ResultsResponse {
                status: JobStatus::Completed,
                result_count: Some(1),
                results: vec![ResultPost {
                    author: "Ada".to_string(),
                    content: "Hiring Rust engineers".to_string(),
                    ..Default::default()
                }],
                queries: vec!["rust hiring".into()],
                skills: Vec::new(),
                job_id: None,
            })
        }
    }

    fn driver(
        service: &Arc<CountingService>,
        dir: &Path,
        input: &'static [u8],
        html: Option<PathBuf>,
    ) -> Driver<CountingService, &'static [u8]> {
        let controller = Controller::new(
            Arc::clone(service),
            Duration::from_secs(3),
            dir.to_path_buf(),
        );
        Driver::with_input(controller, input, html)
    }

    #[tokio::test]
    async fn test_invalid_resume_asks_again() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(CountingService::default());
        let mut driver = driver(&service, dir.path(), b"notes.txt\nq\n", None);

        driver.run(PathBuf::from("cv.docx"), true).await.unwrap();
        assert_eq!(service.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_html_write_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let service = Arc::new(CountingService::default());
        let mut driver = driver(
            &service,
            dir.path(),
            b"",
            Some(blocker.join("page.html")),
        );

        driver.watch("J-1".to_string()).await.unwrap();
        assert_eq!(driver.controller.phase(), Phase::Completed);
        assert_eq!(driver.controller.session().results.len(), 1);
    }
}
