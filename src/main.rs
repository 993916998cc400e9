//! # arxiv_digest
//!
//! Query arXiv for recent computer-science papers by keyword and date window,
//! and fetch the full abstract of a single paper.
//!
//! ## Usage
//!
//! ```sh
//! arxiv_digest scrape 'llm|transformers&robots' 10 08.05 12.05
//! arxiv_digest abstract 2205.00001
//! ```
//!
//! ## Architecture
//!
//! 1. **Harvest**: list raw records for the date window from OAI-PMH ([`sources`])
//! 2. **Filter**: date, category and keyword filters, then sort ([`pipeline`])
//! 3. **Lookup**: fetch one abstract from the Atom API with retries ([`fetcher`])
//! 4. **Output**: text or JSON ([`outputs`])
//!
//! Ctrl-C aborts the running command, including a retry wait.

use chrono::Local;
use clap::Parser;
use std::error::Error as StdError;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod commands;
mod config;
mod error;
mod fetcher;
mod models;
mod outputs;
mod pipeline;
mod query;
mod sources;
mod text;

use api::{HttpFetch, RetryFetch, TokioSleep};
use cli::{Cli, Command, ScrapeArgs};
use commands::ScrapeOptions;
use config::Config;
use error::{Error, Result};
use fetcher::AbstractFetcher;
use outputs::{json, plain};
use serde::Serialize;
use sources::oai::OaiSource;
use sources::{RecordSource, StaticSource};

#[tokio::main]
async fn main() -> std::result::Result<ExitCode, Box<dyn StdError>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let outcome = tokio::select! {
        res = run(&args) => res,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; abandoning command");
            return Ok(ExitCode::from(130));
        }
    };

    let elapsed = start_time.elapsed();
    match outcome {
        Ok(()) => {
            info!(?elapsed, "Execution complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::InvalidCriteria(msg)) => {
            eprintln!("{msg}");
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            error!(?elapsed, error = %e, "Command failed");
            Err(e.into())
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run(args: &Cli) -> Result<()> {
    let config = Config::load(args.config.as_deref()).await?;
    let http = HttpFetch::new(&config.user_agent, config.request_timeout())?;

    match &args.command {
        Command::Scrape(scrape_args) => match &scrape_args.records {
            Some(path) => {
                let source = StaticSource::from_json_file(path).await?;
                run_scrape(args, scrape_args, &config, &source).await
            }
            None => {
                let source = OaiSource::new(
                    RetryFetch::new(http, TokioSleep, config.retry_policy()),
                    config.oai_url()?,
                    config.archive_set.clone(),
                    config.abs_url_base.clone(),
                );
                run_scrape(args, scrape_args, &config, &source).await
            }
        },
        Command::Abstract { id } => {
            let fetcher = AbstractFetcher::new(
                RetryFetch::new(http, TokioSleep, config.retry_policy()),
                config.query_url()?,
                config.abs_url_base.clone(),
            );
            let lookup = commands::get_abstract(&fetcher, id).await?;
            emit(args, &lookup, || plain::render_abstract(&lookup)).await
        }
    }
}

async fn run_scrape<R: RecordSource>(
    args: &Cli,
    scrape_args: &ScrapeArgs,
    config: &Config,
    source: &R,
) -> Result<()> {
    let options = ScrapeOptions {
        mode: scrape_args.mode,
        categories: (!scrape_args.all_categories).then(|| config.categories.clone()),
    };
    let today = Local::now().date_naive();
    let articles = commands::scrape(source, &scrape_args.request(), &options, today).await?;
    emit(args, &articles, || plain::render_articles(&articles)).await
}

/// Print or write a result in the format selected on the command line.
async fn emit<T, F>(args: &Cli, value: &T, render_text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if let Some(path) = &args.output {
        json::write_json(value, path).await
    } else if args.json {
        println!("{}", json::to_json(value)?);
        Ok(())
    } else {
        print!("{}", render_text());
        Ok(())
    }
}
