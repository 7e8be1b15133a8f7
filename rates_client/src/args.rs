//! Command-line arguments for the rates client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use rates_scraper::RowPolicy;
use rates_scraper::fetcher::DEFAULT_RETRIES;
use rates_scraper::source::{DEFAULT_CCY, TARGET_URL};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Rates page URL, without the currency query.
    #[arg(long, default_value = TARGET_URL)]
    pub url: String,

    /// Currency context sent as the `ccy` query parameter.
    #[arg(long, default_value = DEFAULT_CCY)]
    pub ccy: String,

    /// Use the raw HTTP response instead of rendering page scripts.
    #[arg(long)]
    pub no_render: bool,

    /// Chromium executable used for rendering.
    #[arg(long, default_value = "chromium")]
    pub chromium: PathBuf,

    /// Virtual time, in seconds, page scripts get before the DOM is dumped.
    #[arg(long, default_value_t = 8)]
    pub render_budget_secs: u64,

    /// Re-fetches allowed when the page is not fully populated.
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Shortest pause between attempts, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub backoff_min_ms: u64,

    /// Longest pause between attempts (exclusive), in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub backoff_max_ms: u64,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Stop retrying once this many seconds have passed.
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Extra request header, repeatable.
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// What to do with a malformed table row.
    #[arg(long, value_enum, default_value_t = RowPolicy::Abort)]
    pub on_malformed: RowPolicy,

    /// Treat a page without any price cell as populated.
    #[arg(long)]
    pub allow_empty_marker: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
