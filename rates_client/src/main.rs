//! Rates Client — fetches the live rates page once, waits until its price
//! region is fully rendered, extracts every instrument row and prints the
//! result to stdout.
//!
//! Usage example (CLI):
//! ```bash
//! rates_client --ccy php --format json
//! RUST_LOG=debug rates_client --no-render --retries 3 --header "Accept-Language: en-PH"
//! ```
//!
//! Ctrl+C cancels a pending retry pause; an in-flight request finishes first.
#![warn(missing_docs)]
mod args;
mod output;

use crate::args::Args;
use crate::output::format_snapshot;
use clap::Parser;
use log::{error, info, warn};
use rates_common::{RateError, RateSnapshot, Result};
use rates_scraper::source::{parse_header, target_url};
use rates_scraper::{
    Backoff, CancelToken, ChromiumRenderer, FetchOptions, Fetcher, HttpSource,
    PriceCellValidator, RateExtractor,
};
use reqwest::header::HeaderMap;
use std::time::{Duration, Instant};

/// Runs one fetch → validate → extract cycle described by `args`.
fn run(args: &Args, cancel: CancelToken) -> Result<RateSnapshot, RateError> {
    let url = target_url(&args.url, &args.ccy)?;

    let mut headers = HeaderMap::new();
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        headers.insert(name, value);
    }

    let render = !args.no_render;
    let mut source = HttpSource::new(Duration::from_secs(args.timeout_secs))?;
    if render {
        source = source.with_renderer(
            ChromiumRenderer::new(&args.chromium)
                .virtual_time_budget(Duration::from_secs(args.render_budget_secs)),
        );
    }

    let mut validator = PriceCellValidator::moneybees()?;
    if args.allow_empty_marker {
        validator = validator.allow_empty();
    }

    let options = FetchOptions {
        headers,
        render,
        max_retries: args.retries,
        backoff: Backoff::new(
            Duration::from_millis(args.backoff_min_ms),
            Duration::from_millis(args.backoff_max_ms),
        ),
        deadline: args
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    };

    let mut fetcher = Fetcher::new(source, cancel, rand::rng());
    let document = fetcher.fetch(&url, &options, &validator)?;

    let rates = RateExtractor::moneybees()?
        .with_policy(args.on_malformed)
        .extract(&document)?;
    info!("Extracted {} rates from {}", rates.len(), url);

    Ok(RateSnapshot::new(url.as_str(), rates))
}

fn main() -> Result<(), RateError> {
    init_logger();
    let args = Args::parse();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("Ctrl+C received. Cancelling fetch...");
            cancel.cancel();
        }) {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    }

    match run(&args, cancel) {
        Ok(snapshot) => {
            println!("{}", format_snapshot(&snapshot, args.format)?);
            Ok(())
        }
        Err(e) => {
            error!("Failed to fetch rates: {}", e);
            Err(e)
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
