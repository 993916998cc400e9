//! The two user-facing operations: `scrape` and `abstract`.

use crate::api::{FetchAsync, Sleep};
use crate::error::Result;
use crate::fetcher::AbstractFetcher;
use crate::models::{AbstractLookup, FilteredArticle};
use crate::pipeline::filter_articles;
use crate::query::{KeywordMode, ScrapeRequest};
use crate::sources::RecordSource;
use chrono::{Datelike, NaiveDate};
use tracing::{info, instrument};

/// Options of a `scrape` run beyond the request itself.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub mode: KeywordMode,
    /// `None` searches every category the source returns.
    pub categories: Option<Vec<String>>,
}

/// Find up to `request.max_results` matching papers, oldest first.
///
/// Dates in the request are resolved in `today`'s year.
#[instrument(level = "info", skip(source, options), fields(expression = %request.expression))]
pub async fn scrape<R: RecordSource>(
    source: &R,
    request: &ScrapeRequest,
    options: &ScrapeOptions,
    today: NaiveDate,
) -> Result<Vec<FilteredArticle>> {
    let criteria = request.to_criteria(today.year(), options.categories.as_deref(), options.mode)?;
    info!(from = %criteria.date_from, until = %criteria.date_until, "Scraping arXiv");

    let raw = source.fetch_records(criteria.date_from, criteria.date_until).await?;
    let mut articles = filter_articles(raw, &criteria);
    articles.truncate(request.max_results);

    info!(count = articles.len(), "Scrape complete");
    Ok(articles)
}

/// Look up one abstract.
pub async fn get_abstract<T, S>(fetcher: &AbstractFetcher<T, S>, article_id: &str) -> Result<AbstractLookup>
where
    T: FetchAsync,
    S: Sleep,
{
    fetcher.fetch_abstract(article_id).await
}
