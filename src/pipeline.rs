//! Article filter pipeline.
//!
//! Raw records pass through three filters, cheapest first, then get sorted:
//!
//! 1. **Date**: `date_from < created < date_until`, both bounds exclusive
//! 2. **Category**: at least one shared category (skipped when criteria has none)
//! 3. **Keywords**: token-set intersection or regex search over the abstract
//! 4. **Sort & reindex**: ascending by `created`, positions renumbered from 0
//!
//! Every stage logs how many records survived it. Truncation to a maximum
//! count is left to the caller.

use crate::models::{ArticleRecord, FilterCriteria, FilteredArticle, KeywordPredicate};
use crate::text::word_set;
use tracing::{info, instrument};

impl KeywordPredicate {
    /// Whether `abstract_text` satisfies this predicate.
    pub fn matches(&self, abstract_text: &str) -> bool {
        match self {
            KeywordPredicate::TokenSet(keywords) => {
                word_set(abstract_text).iter().any(|w| keywords.contains(w))
            }
            KeywordPredicate::Regex(pattern) => pattern.is_match(abstract_text),
        }
    }
}

/// Apply `criteria` to `raw` and return the surviving records in `created` order.
///
/// Never fails; no match is an empty result. Records sharing a `created` date
/// keep their source order, so identical inputs always give identical output.
#[instrument(level = "info", skip_all, fields(raw = raw.len(), from = %criteria.date_from, until = %criteria.date_until))]
pub fn filter_articles(raw: Vec<ArticleRecord>, criteria: &FilterCriteria) -> Vec<FilteredArticle> {
    let mut articles: Vec<ArticleRecord> = raw
        .into_iter()
        .filter(|a| criteria.date_from < a.created && a.created < criteria.date_until)
        .collect();
    info!(count = articles.len(), "Articles left after date filtering");

    if let Some(categories) = &criteria.categories {
        articles.retain(|a| a.in_any_category(categories));
        info!(count = articles.len(), "Articles left after category filtering");
    }

    if let Some(keywords) = &criteria.keywords {
        articles.retain(|a| keywords.matches(&a.abstract_text));
        info!(count = articles.len(), "Articles left after abstract filtering");
    }

    articles.sort_by_key(|a| a.created);

    articles
        .into_iter()
        .enumerate()
        .map(|(index, article)| FilteredArticle { index, article })
        .collect()
}
