//! Command-line interface definitions.
//!
//! # Examples
//!
//! ```sh
//! # Papers from 8 May to 12 May (exclusive) mentioning (llm or transformers) and robots
//! arxiv_digest scrape 'llm|transformers&robots' 10 08.05 12.05
//!
//! # Whole-word matching, any category, JSON to a file
//! arxiv_digest scrape 'llm|agents' 20 01.05 15.05 --mode tokens --all-categories --output out.json
//!
//! # Full abstract of one paper
//! arxiv_digest abstract 2205.00001
//! ```

use crate::query::{KeywordMode, ScrapeRequest};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "ARXIV_DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Write JSON to this file instead of printing
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search recent papers by keywords and date window
    Scrape(ScrapeArgs),
    /// Fetch the full abstract of one paper
    Abstract {
        /// arXiv identifier, e.g. 2205.00001
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Keywords: `|` is OR, `&` is AND (e.g. `llm|transformers&robots`)
    pub expression: String,

    /// Maximum number of papers to show
    pub max_results: usize,

    /// Start date as day.month, exclusive
    pub start: String,

    /// End date as day.month, exclusive
    pub end: String,

    /// How keywords are matched
    #[arg(long, value_enum, default_value_t = KeywordMode::Regex)]
    pub mode: KeywordMode,

    /// Do not restrict results to the configured categories
    #[arg(long)]
    pub all_categories: bool,

    /// Read raw records from a JSON file instead of harvesting arXiv
    #[arg(long, env = "ARXIV_DIGEST_RECORDS")]
    pub records: Option<PathBuf>,
}

impl ScrapeArgs {
    pub fn request(&self) -> ScrapeRequest {
        ScrapeRequest {
            expression: self.expression.clone(),
            max_results: self.max_results,
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}
