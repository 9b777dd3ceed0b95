//! mrcheck CLI - Main Entry Point
//!
//! Runs the MR1 emphasis-consistency check against a web-hosted sentiment
//! model and writes the per-case report to CSV.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

mod output;

use mrcheck_harness::transform::is_known_emphasizer;
use mrcheck_harness::{
    cases, Browser, BrowserHandle, CsvReporter, MrRunner, RunnerConfig, SutConfig,
};

/// mrcheck - MR1 consistency check for a web sentiment-analysis tool
#[derive(Parser)]
#[command(name = "mrcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the sentiment tool under test
    #[arg(long, default_value = "https://www.clientzen.io/sentiment-analysis-tool")]
    sut_url: String,

    /// CSS selector of the text input
    #[arg(long, default_value = "#Happiness-Score-Text-3")]
    input_selector: String,

    /// CSS selector of the analyze button
    #[arg(long, default_value = "#happiness-score-button")]
    submit_selector: String,

    /// CSS selector of the prediction output
    #[arg(long, default_value = ".aspect-based-sentiment-description")]
    result_selector: String,

    /// YAML file with test sentences (built-in cases when omitted)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// CSV report path
    #[arg(short, long, default_value = "mr1_results.csv")]
    output: PathBuf,

    /// Emphasis word inserted by the MR1 transformation
    #[arg(long, default_value = "really")]
    emphasis: String,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run with a visible browser window
    #[arg(long)]
    no_headless: bool,

    /// Wait window for each element/stabilization wait, in milliseconds
    #[arg(long, default_value = "20000")]
    timeout_ms: u64,

    /// Pause between cases, in milliseconds
    #[arg(long, default_value = "800")]
    pause_ms: u64,

    /// Abort the whole run on the first per-case execution error
    #[arg(long)]
    abort_on_error: bool,

    /// Exit non-zero when any case fails or errors
    #[arg(long)]
    strict: bool,

    /// Also write the full suite result as pretty JSON
    #[arg(long)]
    json_summary: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table")]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let browser: Browser = cli
        .browser
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    if !is_known_emphasizer(&cli.emphasis) {
        warn!(
            "emphasis word {:?} is not in the known safe list; a label flip may \
             reflect the word itself rather than an MR violation",
            cli.emphasis
        );
    }

    let test_cases = match &cli.cases {
        Some(path) => cases::load_file(path)?,
        None => cases::default_cases(),
    };

    let sut = SutConfig {
        url: cli.sut_url,
        input_selector: cli.input_selector,
        submit_selector: cli.submit_selector,
        result_selector: cli.result_selector,
        wait_timeout: Duration::from_millis(cli.timeout_ms),
        headless: !cli.no_headless,
        browser,
        ..SutConfig::default()
    };

    let handle = BrowserHandle::new(sut)?;
    handle.probe_sut().await?;

    let mut reporter = CsvReporter::open(&cli.output)?;
    let runner = MrRunner::new(
        handle,
        RunnerConfig {
            emphasis_word: cli.emphasis,
            pause_between: Duration::from_millis(cli.pause_ms),
            abort_on_error: cli.abort_on_error,
        },
    );

    let suite = runner.run(&test_cases, Some(&mut reporter)).await?;

    output::print_results(&suite, cli.format);
    output::print_summary(&suite);
    println!("Report written to {}", cli.output.display());

    if let Some(path) = &cli.json_summary {
        suite.write_json(path)?;
        println!("JSON summary written to {}", path.display());
    }

    // Pass/fail lives in the report; only --strict folds it into the exit code.
    if cli.strict && !suite.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
