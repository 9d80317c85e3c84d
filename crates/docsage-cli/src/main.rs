//! docsage: rank PDF sections by relevance to a persona and a task.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docsage_core::{AnalyzerConfig, DataPaths};
use docsage_runtime::Orchestrator;

mod inspect;

#[derive(Parser, Debug)]
#[command(name = "docsage")]
#[command(version, about = "Persona-driven section ranking for PDF collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DirArgs {
    /// Directory holding the documents and input.json
    #[arg(long, env = "DOCSAGE_INPUT_DIR", default_value = "/app/input")]
    input_dir: PathBuf,

    /// Directory receiving the JSON output
    #[arg(long, env = "DOCSAGE_OUTPUT_DIR", default_value = "/app/output")]
    output_dir: PathBuf,

    /// Analyzer configuration (JSON)
    #[arg(long, env = "DOCSAGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank sections for the persona and task in input.json
    Analyze {
        #[command(flatten)]
        dirs: DirArgs,

        /// Number of sections to report
        #[arg(long)]
        top_n: Option<usize>,

        /// Number of sections to summarize
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Write a heading outline for every document in the input directory
    Outline {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Show fragments, body size and detected sections of one file
    Inspect {
        file: PathBuf,

        #[arg(long, env = "DOCSAGE_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    Ok(AnalyzerConfig::load(path)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Analyze { dirs, top_n, top_k } => {
            let mut config = load_config(dirs.config.as_deref())?;
            if let Some(n) = top_n {
                config.ranking.top_n = n;
            }
            if let Some(k) = top_k {
                config.ranking.top_k = k;
            }
            let paths = DataPaths::new(&dirs.input_dir, &dirs.output_dir).with_context(|| {
                format!("cannot create output directory {}", dirs.output_dir.display())
            })?;
            info!("Input directory: {}", paths.input_dir.display());

            let orchestrator = Orchestrator::new(config)?;
            let analysis = orchestrator
                .run(&paths)
                .context("analysis run failed")?;
            info!(
                "{} sections ranked from {} documents",
                analysis.report.extracted_sections.len(),
                analysis.summary.processed()
            );
        }
        Command::Outline { dirs } => {
            let config = load_config(dirs.config.as_deref())?;
            let orchestrator = Orchestrator::new(config)?;
            let written = orchestrator
                .outline_dir(&dirs.input_dir, &dirs.output_dir)
                .context("outline export failed")?;
            info!("Wrote {} outlines to {}", written, dirs.output_dir.display());
        }
        Command::Inspect { file, config } => {
            let config = load_config(config.as_deref())?;
            let report = inspect::inspect(&file, &config)?;
            inspect::print_report(&report);
        }
    }

    Ok(())
}
