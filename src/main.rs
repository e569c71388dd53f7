use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use topic_trends::config::Config;
use topic_trends::output::OutputFormat;

/// topic-trends: turn extracted review topics into a daily trend table.
///
/// Merges topics that say the same thing (by embedding similarity), labels
/// each group with one canonical phrasing, and counts them per day over a
/// trailing window.
#[derive(Parser)]
#[command(name = "topic-trends", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate topics and write the trend table and cluster assignment
    Run {
        /// Topic records from the extractor (JSON array or JSON Lines)
        #[arg(long, short)]
        input: PathBuf,

        /// Where to write trend.<ext> and clusters.<ext> (default: TREND_OUTPUT_DIR or ./output)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Last day of the window, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_date)]
        reference_date: Option<NaiveDate>,

        /// Similarity threshold in (-1, 1] (default: TREND_SIMILARITY_THRESHOLD or 0.85)
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,

        /// Trailing window in days (default: TREND_DAYS or 30)
        #[arg(long)]
        days: Option<u32>,

        /// Artifact format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Number of topics to show in the terminal (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Cluster and label topics without building a trend table
    Clusters {
        /// Topic records from the extractor (JSON array or JSON Lines)
        #[arg(long, short)]
        input: PathBuf,

        /// Similarity threshold in (-1, 1]
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,

        /// Also write the assignment to this file (format from extension: .json, else CSV)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topic_trends=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            reference_date,
            threshold,
            days,
            format,
            top,
        } => {
            let mut config = Config::load()?;
            if let Some(t) = threshold {
                config.similarity_threshold = t;
            }
            if let Some(d) = days {
                config.window_days = d;
            }
            // Reject a bad config before reading any input
            let trend_config = config.trend_config()?;
            let reference = reference_date.unwrap_or_else(|| Local::now().date_naive());
            let output_dir = output_dir.unwrap_or(config.output_dir);

            info!(
                threshold = trend_config.similarity_threshold(),
                days = trend_config.window_days(),
                policy = %trend_config.representative_policy(),
                reference = %reference,
                "Starting trend run"
            );

            let records = topic_trends::input::load_topics(&input)?;

            let pb = spinner(&format!("Clustering {} topics...", records.len()))?;
            let result = topic_trends::pipeline::trend::run(records, &trend_config, reference);
            pb.finish_and_clear();
            let report = result?;

            topic_trends::output::terminal::display_trend_table(&report.table, top);

            let (trend_path, clusters_path) =
                topic_trends::output::csv::write_report(&report, &output_dir, format)?;

            topic_trends::output::terminal::display_summary(&report);

            println!(
                "\n{}",
                format!("Trend table saved to: {}", trend_path.display()).bold()
            );
            println!("Cluster assignment saved to: {}", clusters_path.display());
        }

        Commands::Clusters {
            input,
            threshold,
            output,
        } => {
            let mut config = Config::load()?;
            if let Some(t) = threshold {
                config.similarity_threshold = t;
            }
            let trend_config = config.trend_config()?;

            let records = topic_trends::input::load_topics(&input)?;
            let dedup = topic_trends::pipeline::trend::deduplicate(records, &trend_config)?;

            topic_trends::output::terminal::display_clusters(&dedup);

            if let Some(path) = output {
                let format = match path.extension().and_then(|e| e.to_str()) {
                    Some("json") => OutputFormat::Json,
                    _ => OutputFormat::Csv,
                };
                topic_trends::output::csv::write_assignments(&dedup.assignments, &path, format)?;
                println!(
                    "{}",
                    format!("Cluster assignment saved to: {}", path.display()).bold()
                );
            }
        }

        Commands::Config => {
            let config = Config::load()?;
            println!("Similarity threshold: {}", config.similarity_threshold);
            println!("Window:               {} days", config.window_days);
            println!("Representative:       {}", config.representative_policy);
            println!("Output directory:     {}", config.output_dir.display());

            match config.trend_config() {
                Ok(_) => println!("\n{}", "Configuration is valid.".green()),
                Err(e) => println!("\n{} {}", "Invalid:".red().bold(), e),
            }
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    topic_trends::topics::record::parse_day(raw)
}

/// Steady-ticking spinner for the clustering pass.
fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
