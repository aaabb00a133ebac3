//! RustyWordFreq: fetch pages, count words, write reports.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rusty_wordfreq::chart::{self, ChartKind};
use rusty_wordfreq::config::DEFAULT_REPORT_PATH;
use rusty_wordfreq::{report, AnalysisConfig, AnalysisError, AnalysisOutcome, AnalysisSession};

const DEFAULT_CHART_PATH: &str = "chart.json";
const EMPTY_RESULT_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "rusty-wordfreq")]
#[command(about = "Fetch web pages, extract visible text, rank word frequencies")]
#[command(version)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch 1-5 URLs and analyze their combined text.
    Analyze {
        /// Page URLs, fetched in order.
        #[arg(long = "url", short = 'u')]
        urls: Vec<String>,

        /// JSON config file; flags override its values.
        #[arg(long, short, env = "WORDFREQ_CONFIG")]
        config: Option<PathBuf>,

        /// Per-request timeout in seconds (10-15).
        #[arg(long, env = "WORDFREQ_TIMEOUT")]
        timeout: Option<u64>,

        /// Pause between requests in milliseconds.
        #[arg(long, env = "WORDFREQ_DELAY_MS")]
        delay_ms: Option<u64>,

        #[arg(long, env = "WORDFREQ_USER_AGENT")]
        user_agent: Option<String>,

        /// Save each extracted page as pageN.txt in this directory.
        #[arg(long)]
        pages_dir: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze previously saved plain-text pages.
    Files {
        /// Text files, one page each.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Minimum total count for a word to be kept (1-10).
    #[arg(long, short = 'm', env = "WORDFREQ_MIN_FREQ")]
    min_freq: Option<u64>,

    /// Length of the ranked list.
    #[arg(long, short = 'n', env = "WORDFREQ_TOP")]
    top: Option<usize>,

    /// Text report path.
    #[arg(long, short)]
    output: Option<String>,

    /// Also write a JSON report here.
    #[arg(long)]
    json: Option<String>,

    /// Write chart series of this kind.
    #[arg(long, value_enum)]
    chart: Option<ChartKind>,

    #[arg(long, default_value = DEFAULT_CHART_PATH)]
    chart_output: String,

    /// Stopword file replacing the bundled table.
    #[arg(long, env = "WORDFREQ_STOPWORDS")]
    stopwords: Option<String>,

    /// Additional stopword (repeatable).
    #[arg(long = "extra-stopword")]
    extra_stopwords: Vec<String>,
}

impl OutputArgs {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(v) = self.min_freq {
            config.min_freq = v;
        }
        if let Some(v) = self.top {
            config.top_n = v;
        }
        if let Some(v) = &self.output {
            config.report_path = v.clone();
        }
        if let Some(v) = &self.json {
            config.json_path = Some(v.clone());
        }
        if let Some(v) = &self.stopwords {
            config.stopwords_path = Some(v.clone());
        }
        config.extra_stopwords.extend(self.extra_stopwords.iter().cloned());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, output, result) = match cli.command {
        Command::Analyze {
            urls,
            config,
            timeout,
            delay_ms,
            user_agent,
            pages_dir,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => AnalysisConfig::from_file(&path)?,
                None => AnalysisConfig::default(),
            };
            if !urls.is_empty() {
                cfg.urls = urls.iter().map(|u| u.trim().to_string()).collect();
            }
            if let Some(v) = timeout {
                cfg.timeout_secs = v;
            }
            if let Some(v) = delay_ms {
                cfg.request_delay_ms = v;
            }
            if let Some(v) = user_agent {
                cfg.user_agent = v;
            }
            if pages_dir.is_some() {
                cfg.pages_dir = pages_dir;
            }
            output.apply(&mut cfg);
            cfg.validate()?;

            let result = AnalysisSession::new(cfg.clone())?.run();
            (cfg, output, result)
        }
        Command::Files { paths, output } => {
            let mut cfg = AnalysisConfig::default();
            output.apply(&mut cfg);
            let result = AnalysisSession::new(cfg.clone())?.run_files(&paths);
            (cfg, output, result)
        }
    };

    match result {
        Ok(outcome) => {
            write_outputs(&config, &output, &outcome);
            print_ranking(&outcome, config.top_n);
            Ok(())
        }
        Err(AnalysisError::EmptyResult { min_freq }) => {
            eprintln!(
                "No words reached the minimum frequency of {}; lower the threshold. No report written.",
                min_freq
            );
            std::process::exit(EMPTY_RESULT_EXIT_CODE);
        }
        Err(e) => Err(e.into()),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rusty_wordfreq={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Artifact failures are logged; the ranking is still printed.
fn write_outputs(config: &AnalysisConfig, output: &OutputArgs, outcome: &AnalysisOutcome) {
    let report_path = if config.report_path.is_empty() {
        DEFAULT_REPORT_PATH
    } else {
        config.report_path.as_str()
    };
    if let Err(e) = report::write_text(
        Path::new(report_path),
        &outcome.table,
        &outcome.top,
        config.top_n,
    ) {
        warn!(error = %e, "failed to write report");
    }

    if let Some(path) = &config.json_path {
        if let Err(e) = report::write_json(Path::new(path), &outcome.table, &outcome.top) {
            warn!(error = %e, "failed to write JSON report");
        }
    }

    if let Some(kind) = output.chart {
        let path = Path::new(&output.chart_output);
        match chart::write_chart(path, kind, &outcome.table, &outcome.top) {
            Ok(()) => info!(path = %path.display(), ?kind, "chart data written"),
            Err(e) => warn!(error = %e, "failed to write chart data"),
        }
    }
}

fn print_ranking(outcome: &AnalysisOutcome, top_n: usize) {
    let stats = &outcome.stats;
    println!(
        "Analyzed {} of {} sources ({} skipped), {} distinct words",
        stats.documents,
        stats.requested,
        stats.skipped(),
        outcome.table.len()
    );
    println!("Top {} words:", top_n);
    println!("{:<6}{:<12}{}", "rank", "token", "count");
    for entry in outcome.top.iter() {
        println!("{:<6}{:<12}{}", entry.rank, entry.token, entry.count);
    }
}
