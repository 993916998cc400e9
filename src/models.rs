//! Data models for arXiv records, query criteria and abstract lookups.
//!
//! - [`ArticleRecord`]: an unfiltered record from a [`crate::sources::RecordSource`]
//! - [`FilterCriteria`] / [`KeywordPredicate`]: the constraints of one query
//! - [`FilteredArticle`]: a record in a filter result, with its 0-based position
//! - [`AbstractRecord`] / [`AbstractLookup`]: the outcome of one abstract fetch

use chrono::{Local, NaiveDate};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A raw article descriptor as produced by a record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Stable arXiv identifier, e.g. `2205.00001`.
    pub id: String,
    pub title: String,
    /// Category tokens in source order, e.g. `["cs.CL", "cs.AI"]`.
    pub categories: Vec<String>,
    /// Free text; may embed literal newlines.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub created: NaiveDate,
    pub updated: Option<NaiveDate>,
    pub authors: Vec<String>,
    pub url: String,
}

impl ArticleRecord {
    /// Whether any of the record's categories appears in `wanted`.
    ///
    /// `wanted` is expected lowercase; see [`FilterCriteria::with_categories`].
    pub fn in_any_category(&self, wanted: &BTreeSet<String>) -> bool {
        self.categories
            .iter()
            .any(|c| wanted.contains(&c.to_lowercase()))
    }
}

/// A conjunction of case-insensitive regexes evaluated against raw abstract text.
///
/// Each clause may use `|` alternation; every clause must match somewhere. A
/// single regex is a one-clause pattern.
#[derive(Debug, Clone)]
pub struct AbstractPattern {
    clauses: Vec<Regex>,
}

impl AbstractPattern {
    /// Compile several regexes that must all match.
    pub fn all_of<'a, I>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let clauses = patterns
            .into_iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.clauses.iter().all(|re| re.is_match(text))
    }
}

/// How the abstract of a record is matched against the user's keywords.
#[derive(Debug, Clone)]
pub enum KeywordPredicate {
    /// Lowercase words; a record passes if any word of its abstract is in the set.
    TokenSet(BTreeSet<String>),
    /// Pattern search over the raw abstract text.
    Regex(AbstractPattern),
}

/// Constraints for one query. Built per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// Exclusive lower bound on `created`.
    pub date_from: NaiveDate,
    /// Exclusive upper bound on `created`.
    pub date_until: NaiveDate,
    /// Lowercase category codes; `None` means no category restriction.
    pub categories: Option<BTreeSet<String>>,
    /// `None` means no content filter.
    pub keywords: Option<KeywordPredicate>,
}

impl FilterCriteria {
    /// Criteria for `(date_from, date_until)`; a missing upper bound means today.
    pub fn between(date_from: NaiveDate, date_until: Option<NaiveDate>) -> Self {
        Self {
            date_from,
            date_until: date_until.unwrap_or_else(|| Local::now().date_naive()),
            categories: None,
            keywords: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = Some(
            categories
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        );
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordPredicate) -> Self {
        self.keywords = Some(keywords);
        self
    }
}

/// One entry of a filter result. `index` is the entry's 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredArticle {
    pub index: usize,
    #[serde(flatten)]
    pub article: ArticleRecord,
}

/// Full abstract of a single paper, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbstractRecord {
    pub title: String,
    /// Paragraph-reflowed abstract text.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub published: NaiveDate,
    pub url: String,
}

/// Result of an abstract lookup. Callers must check for `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AbstractLookup {
    Found(AbstractRecord),
    NotFound,
}
