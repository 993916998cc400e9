//! Raw article sources feeding the filter pipeline.
//!
//! A source yields *unfiltered* [`ArticleRecord`]s for a date window; all
//! date, category and keyword filtering happens afterwards in
//! [`crate::pipeline`].
//!
//! # Implementations
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | arXiv OAI-PMH | [`oai`] | `ListRecords`, `arXiv` metadata | Paged with resumption tokens; 503s retried |
//! | In-memory | [`StaticSource`] | Fixed record list | Offline runs (`--records`) and tests |

use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, instrument};

pub mod oai;

/// Trait for anything that can list raw article records.
pub trait RecordSource {
    /// List the records the source considers relevant to `[date_from, date_until]`.
    ///
    /// The window is a hint for the harvest; the pipeline still applies its own
    /// strict date filter on `created`.
    async fn fetch_records(
        &self,
        date_from: NaiveDate,
        date_until: NaiveDate,
    ) -> Result<Vec<ArticleRecord>>;
}

/// A fixed list of records, returned as-is for any window.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<ArticleRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self { records }
    }

    /// Load records from a JSON array of [`ArticleRecord`]s.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let records: Vec<ArticleRecord> = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("records file: {e}")))?;
        info!(count = records.len(), "Loaded records from file");
        Ok(Self::new(records))
    }
}

impl RecordSource for StaticSource {
    async fn fetch_records(&self, _: NaiveDate, _: NaiveDate) -> Result<Vec<ArticleRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_static_source_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "id": "2205.00001",
                "title": "A Comprehensive Overview of Large Language Models",
                "categories": ["cs.CL"],
                "abstract": "Large Language Models have recently demonstrated remarkable capabilities.",
                "created": "2022-05-11",
                "updated": null,
                "authors": ["Jane Doe"],
                "url": "https://arxiv.org/abs/2205.00001"
            }}]"#
        )
        .unwrap();

        let source = StaticSource::from_json_file(file.path()).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
        let records = source.fetch_records(day, day).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].created, NaiveDate::from_ymd_opt(2022, 5, 11).unwrap());
    }

    #[tokio::test]
    async fn test_static_source_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not a list").unwrap();

        let err = StaticSource::from_json_file(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
