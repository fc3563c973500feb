//! Command-line interface: `serve` runs the API, `analyze` is the terminal client.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, error, info};

use crate::dashboard::render::{render_dashboard, ConsoleRenderer};
use crate::dashboard::{ScoreAnimation, ScoreCard, ANIMATION_TICK};
use crate::intake::form::{InputForm, Submission};
use crate::intake::notification::Notification;
use crate::intake::validation::ResumeCandidate;
use crate::pipeline::http::HttpMatchBackend;
use crate::pipeline::{AnalysisPipeline, CancelToken};

#[derive(Parser)]
#[command(name = "resumematch", version)]
#[command(about = "Match a resume against a job description")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the upload and analysis API
    Serve,

    /// Upload a resume and job description, then show the analysis
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Resume file (PDF, DOC, DOCX)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// File containing a job description; repeat to match against several postings
    #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
    pub job: Vec<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,

    /// Base URL of a running `resumematch serve`
    #[arg(long, env = "RESUMEMATCH_URL", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Print the raw analysis as JSON instead of the dashboard
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Per-step timeout in seconds
    #[arg(long, default_value_t = 90)]
    pub timeout: u64,
}

/// How an `analyze` run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    Shown,
    /// The inputs never left the machine.
    Rejected,
    Failed,
    Cancelled,
}

impl From<AnalyzeOutcome> for ExitCode {
    fn from(outcome: AnalyzeOutcome) -> Self {
        match outcome {
            AnalyzeOutcome::Shown => ExitCode::SUCCESS,
            AnalyzeOutcome::Rejected => ExitCode::from(2),
            AnalyzeOutcome::Failed => ExitCode::FAILURE,
            AnalyzeOutcome::Cancelled => ExitCode::from(130),
        }
    }
}

pub async fn run_analyze(args: AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let use_colors = !args.no_color && std::io::stdout().is_terminal();

    let jobs = read_job_descriptions(&args).await?;
    let candidate = ResumeCandidate::from_path(&args.resume)
        .await
        .with_context(|| format!("Failed to read resume {}", args.resume.display()))?;
    debug!(
        file = %candidate.file_name,
        size_bytes = candidate.size_bytes,
        mime = ?candidate.mime,
        "Resume selected"
    );

    let backend =
        HttpMatchBackend::new(args.server.as_str()).context("Failed to build HTTP client")?;
    let pipeline = AnalysisPipeline::new(backend, Duration::from_secs(args.timeout));

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let many = jobs.len() > 1;
    let mut form = InputForm::new();
    let mut shown = Vec::new();
    let mut outcome = AnalyzeOutcome::Shown;

    for (index, (source, job_description)) in jobs.into_iter().enumerate() {
        if index > 0 {
            form.new_analysis();
        }
        let Some(submission) = fill_form(&mut form, candidate.clone(), job_description) else {
            print_notifications(&form.take_notifications(), use_colors);
            return Ok(AnalyzeOutcome::Rejected);
        };

        info!(server = %args.server, job = %source, "Submitting resume for analysis");
        let attempt = pipeline.run(&submission, &cancel).await;
        if let Err(e) = &attempt {
            error!(job = %source, "Analysis attempt failed: {e}");
        }
        form.complete(attempt);
        print_notifications(&form.take_notifications(), use_colors);

        if cancel.is_cancelled() {
            return Ok(AnalyzeOutcome::Cancelled);
        }
        let Some(result) = form.result() else {
            outcome = AnalyzeOutcome::Failed;
            continue;
        };

        if args.json {
            shown.push(serde_json::to_value(result)?);
            continue;
        }
        if many {
            println!("\n{}", ConsoleRenderer::new(use_colors).job_heading(&source));
        }
        if use_colors {
            animate_score(&ScoreCard::from_result(result)).await?;
        }
        println!("{}", render_dashboard(result, use_colors));
    }

    if args.json && !shown.is_empty() {
        let document = if many {
            serde_json::Value::Array(shown)
        } else {
            shown.remove(0)
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(outcome)
}

/// Job descriptions to match against, each paired with where it came from.
async fn read_job_descriptions(args: &AnalyzeArgs) -> Result<Vec<(String, String)>> {
    if let Some(text) = &args.job_text {
        return Ok(vec![("inline".to_string(), text.clone())]);
    }
    let mut jobs = Vec::with_capacity(args.job.len());
    for path in &args.job {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description {}", path.display()))?;
        jobs.push((path.display().to_string(), text));
    }
    Ok(jobs)
}

/// Selects the resume, enters the job text, and starts a submission. `None` when the
/// form refuses; the reason is left in its notifications.
fn fill_form(
    form: &mut InputForm,
    candidate: ResumeCandidate,
    job_description: String,
) -> Option<Submission> {
    form.select_file(candidate).ok()?;
    form.set_job_description(job_description);
    debug!(
        characters = form.character_count(),
        phase = ?form.phase(),
        ready = form.can_submit(),
        "Form filled"
    );
    form.begin_submit().ok()
}

/// Counts the score up on a single terminal line before the full dashboard is printed.
async fn animate_score(card: &ScoreCard) -> Result<()> {
    let renderer = ConsoleRenderer::new(true);
    let mut stdout = std::io::stdout();
    let mut ticker = tokio::time::interval(ANIMATION_TICK);
    for frame in ScoreAnimation::new(card.score) {
        ticker.tick().await;
        write!(stdout, "\r{}", renderer.counter_line(frame, card.tier))?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn print_notifications(notifications: &[Notification], use_colors: bool) {
    for note in notifications {
        let marker = match (note.is_error(), use_colors) {
            (true, true) => "✗".red().bold().to_string(),
            (false, true) => "✓".green().bold().to_string(),
            (true, false) => "✗".to_string(),
            (false, false) => "✓".to_string(),
        };
        eprintln!("{marker} {}: {}", note.title, note.message);
    }
}
