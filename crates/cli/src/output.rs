//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mrcheck_harness::{CaseResult, SuiteResult};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

fn headers() -> Vec<&'static str> {
    vec!["id", "original", "transformed", "orig. prediction", "transf. prediction", "result"]
}

fn row(result: &CaseResult) -> Vec<String> {
    vec![
        result.id.to_string(),
        result.original_text.clone(),
        result.transformed_text.clone(),
        result.original_prediction.clone().unwrap_or_default(),
        result.transformed_prediction.clone().unwrap_or_default(),
        if result.passed { "pass".to_string() } else { "fail".to_string() },
    ]
}

/// Print all case results in the requested format.
pub fn print_results(suite: &SuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(headers());
            for result in &suite.results {
                table.add_row(row(result));
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(suite).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for result in &suite.results {
                for (header, value) in headers().iter().zip(row(result).iter()) {
                    println!("{}: {}", header, value);
                }
                println!();
            }
        }
    }
}

/// One-line colored summary after the per-case output.
pub fn print_summary(suite: &SuiteResult) {
    let verdict = if suite.all_passed() {
        "MR1 HOLDS".green().bold()
    } else {
        "MR1 VIOLATED".red().bold()
    };
    println!(
        "{}: {} case(s), {} passed, {} failed, {} errored ({} ms)",
        verdict,
        suite.total,
        suite.passed.to_string().green(),
        suite.failed.to_string().red(),
        suite.errored.to_string().yellow(),
        suite.duration_ms
    );
}
