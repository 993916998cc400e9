//! Translation of user input into [`FilterCriteria`].
//!
//! Users write dates as `day.month` (the year is implied) and keywords as a
//! small expression language: `|` means OR, `&` means AND, and `&` binds
//! loosest, so `llm|transformers&robots` reads as
//! "(llm OR transformers) AND robots".

use crate::error::{Error, Result};
use crate::models::{AbstractPattern, FilterCriteria, KeywordPredicate};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static NEW_STYLE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?$").expect("valid new-style id regex"));
static OLD_STYLE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z\-]*(\.[A-Z]{2})?/\d{7}(v\d+)?$").expect("valid old-style id regex"));

/// How a keyword expression is matched against abstracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KeywordMode {
    /// Case-insensitive regex search; `&` splits AND-clauses.
    #[default]
    Regex,
    /// Whole-word match against the abstract's words; `&` and `|` both mean OR.
    Tokens,
}

/// The arguments of one `scrape` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub expression: String,
    pub max_results: usize,
    /// `day.month`, exclusive lower bound.
    pub start: String,
    /// `day.month`, exclusive upper bound.
    pub end: String,
}

/// Parse `day.month` (e.g. `08.05`) into a date in `year`.
pub fn parse_day_month(input: &str, year: i32) -> Result<NaiveDate> {
    let invalid = || Error::InvalidCriteria(format!("expected a date as day.month, got '{input}'"));
    let (day, month) = input.trim().split_once('.').ok_or_else(invalid)?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Turn a keyword expression into a [`KeywordPredicate`].
pub fn parse_keyword_expression(expression: &str, mode: KeywordMode) -> Result<KeywordPredicate> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(Error::InvalidCriteria("keyword expression is empty".into()));
    }

    match mode {
        KeywordMode::Tokens => {
            let words: BTreeSet<String> = expression
                .replace('&', "|")
                .split('|')
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
            if words.is_empty() {
                return Err(Error::InvalidCriteria(format!("no keywords in '{expression}'")));
            }
            Ok(KeywordPredicate::TokenSet(words))
        }
        KeywordMode::Regex => {
            let clauses: Vec<&str> = expression
                .split('&')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
            if clauses.is_empty() {
                return Err(Error::InvalidCriteria(format!("no keywords in '{expression}'")));
            }
            AbstractPattern::all_of(clauses)
                .map(KeywordPredicate::Regex)
                .map_err(|e| Error::InvalidCriteria(format!("bad keyword pattern: {e}")))
        }
    }
}

/// Check that `id` looks like an arXiv identifier, new style or old style.
pub fn validate_article_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if NEW_STYLE_ID.is_match(id) || OLD_STYLE_ID.is_match(id) {
        Ok(id)
    } else {
        Err(Error::InvalidCriteria(format!("'{id}' is not an arXiv identifier")))
    }
}

impl ScrapeRequest {
    /// Build criteria for this request with dates in `year`.
    ///
    /// `categories` of `None` applies no category restriction.
    pub fn to_criteria(
        &self,
        year: i32,
        categories: Option<&[String]>,
        mode: KeywordMode,
    ) -> Result<FilterCriteria> {
        if self.max_results == 0 {
            return Err(Error::InvalidCriteria("max results must be at least 1".into()));
        }
        let date_from = parse_day_month(&self.start, year)?;
        let date_until = parse_day_month(&self.end, year)?;
        if date_from >= date_until {
            return Err(Error::InvalidCriteria(format!(
                "start date {date_from} must be before end date {date_until}"
            )));
        }

        let keywords = parse_keyword_expression(&self.expression, mode)?;
        let criteria = FilterCriteria::between(date_from, Some(date_until)).with_keywords(keywords);
        Ok(match categories {
            Some(categories) => criteria.with_categories(categories),
            None => criteria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(expression: &str, max: usize, start: &str, end: &str) -> ScrapeRequest {
        ScrapeRequest {
            expression: expression.to_string(),
            max_results: max,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn test_parse_day_month() {
        assert_eq!(
            parse_day_month("08.05", 2024).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
        );
        assert_eq!(
            parse_day_month("1.12", 2024).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_day_month_rejects_garbage() {
        for bad in ["", "0805", "32.01", "10.13", "aa.bb", "29.02.2024"] {
            assert!(
                matches!(parse_day_month(bad, 2023), Err(Error::InvalidCriteria(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_regex_expression_and_binds_loosest() {
        let predicate = parse_keyword_expression("llm|transformers&robots", KeywordMode::Regex).unwrap();
        assert!(predicate.matches("Transformers for robots"));
        assert!(predicate.matches("An LLM drives ROBOTS"));
        assert!(!predicate.matches("Transformers for language"));
        assert!(!predicate.matches("Robots alone"));
    }

    #[test]
    fn test_token_expression_is_a_union() {
        let KeywordPredicate::TokenSet(words) =
            parse_keyword_expression("LLM|transformers&robots", KeywordMode::Tokens).unwrap()
        else {
            panic!("expected token set");
        };
        assert_eq!(
            words.into_iter().collect::<Vec<_>>(),
            vec!["llm", "robots", "transformers"]
        );
    }

    #[test]
    fn test_empty_or_invalid_expression() {
        assert!(parse_keyword_expression("  ", KeywordMode::Regex).is_err());
        assert!(parse_keyword_expression("&|&", KeywordMode::Tokens).is_err());
        assert!(matches!(
            parse_keyword_expression("(llm", KeywordMode::Regex),
            Err(Error::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_validate_article_id() {
        assert_eq!(validate_article_id(" 2205.00001 ").unwrap(), "2205.00001");
        assert!(validate_article_id("2301.07041v2").is_ok());
        assert!(validate_article_id("math.AG/0601001").is_ok());
        assert!(validate_article_id("hep-th/9901001").is_ok());
        assert!(validate_article_id("2205.00001&id_list=x").is_err());
        assert!(validate_article_id("").is_err());
    }

    #[test]
    fn test_to_criteria() {
        let categories = vec!["cs.cl".to_string(), "cs.ai".to_string()];
        let criteria = request("llm", 10, "08.05", "12.05")
            .to_criteria(2024, Some(&categories), KeywordMode::Regex)
            .unwrap();

        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
        assert_eq!(criteria.date_until, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        assert_eq!(criteria.categories.unwrap().len(), 2);
        assert!(matches!(criteria.keywords, Some(KeywordPredicate::Regex(_))));
    }

    #[test]
    fn test_to_criteria_without_categories() {
        let criteria = request("llm", 10, "08.05", "12.05")
            .to_criteria(2024, None, KeywordMode::Tokens)
            .unwrap();
        assert!(criteria.categories.is_none());
    }

    #[test]
    fn test_to_criteria_rejects_bad_requests() {
        assert!(request("llm", 0, "08.05", "12.05").to_criteria(2024, None, KeywordMode::Regex).is_err());
        assert!(request("llm", 5, "12.05", "08.05").to_criteria(2024, None, KeywordMode::Regex).is_err());
        assert!(request("llm", 5, "12.05", "12.05").to_criteria(2024, None, KeywordMode::Regex).is_err());
        assert!(request("llm", 5, "x", "12.05").to_criteria(2024, None, KeywordMode::Regex).is_err());
    }
}
