mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use newsvox_pipeline::{NewsSentimentPipeline, PipelineConfig, RunOptions, MAX_ITEMS_LIMIT};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newsvox")]
#[command(about = "Company news sentiment analysis with translated audio narration")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze recent news for a single company
    Analyze {
        /// Company name to search for
        company: String,

        /// Maximum number of articles to analyze (1-20)
        #[arg(long, value_parser = parse_max_items)]
        max_items: Option<usize>,

        /// Where to write the narration audio
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the full result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Prompt for company names until `quit`
    Interactive {
        /// Where to write the narration audio
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = newsvox_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pipeline = NewsSentimentPipeline::new(&PipelineConfig::from_app_config(&config))?;

    match cli.command {
        Some(Commands::Analyze {
            company,
            max_items,
            output,
            json,
        }) => {
            let options = RunOptions {
                max_items: max_items.unwrap_or(config.max_items),
                audio_path: output.unwrap_or_else(|| config.audio_file.clone()),
            };
            run_analyze(&pipeline, &company, &options, json).await?;
        }
        Some(Commands::Interactive { output }) => {
            let audio_path = output.unwrap_or_else(|| config.audio_file.clone());
            let stdin = BufReader::new(tokio::io::stdin());
            run_interactive(&pipeline, stdin, config.max_items, &audio_path).await?;
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            run_interactive(&pipeline, stdin, config.max_items, &config.audio_file).await?;
        }
    }

    Ok(())
}

async fn run_analyze(
    pipeline: &NewsSentimentPipeline,
    company: &str,
    options: &RunOptions,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = pipeline.run(company.trim(), options).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", report::render_outcome(&outcome));
    }
    Ok(())
}

/// Read company names line by line and run the pipeline for each.
///
/// Blank lines are skipped; `quit` or `exit` (or end of input) ends the loop.
/// A failed run is reported and the loop keeps going.
async fn run_interactive<R>(
    pipeline: &NewsSentimentPipeline,
    input: R,
    max_items: usize,
    audio_path: &Path,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let options = RunOptions {
        max_items,
        audio_path: audio_path.to_path_buf(),
    };

    loop {
        println!("Enter Company Name:");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let company = line.trim();
        if company.is_empty() {
            continue;
        }
        if is_quit_command(company) {
            break;
        }

        match pipeline.run(company, &options).await {
            Ok(outcome) => print!("{}", report::render_outcome(&outcome)),
            Err(e) => {
                tracing::error!(company, error = %e, "analysis failed");
                eprintln!("analysis failed for '{company}': {e}");
            }
        }
    }

    Ok(())
}

fn parse_max_items(value: &str) -> Result<usize, String> {
    let max_items: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if (1..=MAX_ITEMS_LIMIT).contains(&max_items) {
        Ok(max_items)
    } else {
        Err(format!("must be between 1 and {MAX_ITEMS_LIMIT}"))
    }
}

fn is_quit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")
}
