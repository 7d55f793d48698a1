// src/cli.rs
use crate::bridge::{ContentEndpoint, InProcessTabs};
use crate::core::{ConfigManager, FsOps};
use crate::extraction::{LivePage, TextExtractor};
use crate::keywords::JobKeywords;
use crate::orchestrator::{AnalysisOrchestrator, AnalyzeOutcome};
use crate::storage::{FileStorage, ResumeStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "resume-radar")]
#[command(about = "Check a résumé against the keywords of a job posting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the configured storage file
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a résumé (plain text) for later analyses
    Upload { file: PathBuf },
    /// Analyze the stored résumé against a job posting
    Analyze {
        /// Job description text
        #[arg(long, conflicts_with = "job_file")]
        job_text: Option<String>,
        /// Read the job description from a file
        #[arg(long)]
        job_file: Option<PathBuf>,
        /// HTML page to auto-extract from when no text is given
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// Extract title and description from a saved job page
    Extract {
        page: PathBuf,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Turn comma/semicolon/newline separated lists into keyword specs
    Keywords {
        required: String,
        #[arg(default_value = "")]
        preferred: String,
    },
    /// Show which résumé is stored
    Status,
    /// Remove the stored résumé
    Forget,
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    if let Some(storage) = cli.storage {
        config.settings.storage_path = storage;
    }

    match cli.command {
        Command::Upload { file } => {
            let orchestrator = crate::build_orchestrator(&config, Arc::new(InProcessTabs::new()))?;
            let result = orchestrator.upload_file(&file).await;
            println!("{}", orchestrator.state().message);
            result.map(|_| ())
        }

        Command::Analyze {
            job_text,
            job_file,
            page,
        } => {
            let tabs = Arc::new(InProcessTabs::new());
            if let Some(page_path) = page {
                let live_page = Arc::new(LivePage::from_file(&page_path).await?);
                let extractor = TextExtractor::with_timeout(config.extraction_timeout());
                tabs.open_with_endpoint(ContentEndpoint::new(live_page, extractor));
                info!("Serving job page {}", page_path.display());
            }

            let orchestrator = crate::build_orchestrator(&config, tabs)?;
            orchestrator.initialize().await?;

            let pasted = match (job_text, job_file) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(FsOps::read_text_lossy(&path).await?),
                (None, None) => None,
            };
            if let Some(text) = pasted {
                orchestrator.set_job_text(text);
            }

            run_analysis(&orchestrator).await
        }

        Command::Extract { page, timeout_ms } => {
            let live_page = LivePage::from_file(&page).await?;
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.extraction_timeout());
            let description = TextExtractor::with_timeout(timeout)
                .extract_job_description(&live_page)
                .await;
            println!(
                "{}",
                serde_json::to_string_pretty(&description)
                    .context("Failed to serialize job description")?
            );
            Ok(())
        }

        Command::Keywords {
            required,
            preferred,
        } => {
            let keywords = JobKeywords::from_lists(&required, &preferred);
            println!(
                "{}",
                serde_json::to_string_pretty(&keywords).context("Failed to serialize keywords")?
            );
            Ok(())
        }

        Command::Status => {
            match resume_store(&config).load_resume().await? {
                Some(record) => println!("Using: {} ({} chars)", record.name, record.text.len()),
                None => println!("No resume stored"),
            }
            Ok(())
        }

        Command::Forget => {
            resume_store(&config).clear().await?;
            println!("Stored resume removed");
            Ok(())
        }
    }
}

fn resume_store(config: &ConfigManager) -> ResumeStore {
    ResumeStore::new(Arc::new(FileStorage::new(&config.settings.storage_path)))
}

async fn run_analysis(orchestrator: &AnalysisOrchestrator) -> Result<()> {
    let outcome = orchestrator.analyze().await;
    let state = orchestrator.state();

    match outcome {
        AnalyzeOutcome::Completed => {
            if let Some(view) = &state.result {
                println!("{}", view.render_text());
            }
            Ok(())
        }
        AnalyzeOutcome::Busy => anyhow::bail!("Another analysis is already running"),
        AnalyzeOutcome::MissingResume
        | AnalyzeOutcome::MissingJobText
        | AnalyzeOutcome::Failed(_) => {
            println!("{}", state.message);
            Ok(())
        }
    }
}
