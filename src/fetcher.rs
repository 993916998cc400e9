//! Full-abstract lookup through the arXiv Atom query API.
//!
//! One lookup is one `GET <endpoint>?id_list=<id>`, retried while arXiv
//! answers 503 (see [`crate::api::RetryFetch`]). Nothing is cached.
//!
//! # Outcomes
//!
//! - `Ok(Found(..))`: title, reflowed abstract, published date and abs URL
//! - `Ok(NotFound)`: retries exhausted, empty feed, or an arXiv error entry
//! - `Err(..)`: any other HTTP failure, or a feed that does not parse

use crate::api::{FetchAsync, RetryFetch, Sleep};
use crate::error::{Error, FetchError, Result};
use crate::models::{AbstractLookup, AbstractRecord};
use crate::query::validate_article_id;
use crate::text::{normalize_abstract, truncate_for_log};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: String,
}

impl Entry {
    /// arXiv reports bad ids as an entry whose id points at its error docs.
    fn is_api_error(&self) -> bool {
        self.id.contains("/api/errors")
    }
}

/// Parse an Atom feed into the record for `article_id`.
///
/// Returns `Ok(None)` when the feed carries no usable entry.
pub fn parse_feed(xml: &str, article_id: &str, abs_url_base: &str) -> Result<Option<AbstractRecord>> {
    let feed: Feed = quick_xml::de::from_str(xml)?;

    let Some(entry) = feed.entries.into_iter().next() else {
        return Ok(None);
    };
    if entry.is_api_error() {
        warn!(summary = %truncate_for_log(entry.summary.trim(), 200), "arXiv returned an error entry");
        return Ok(None);
    }

    let published = DateTime::parse_from_rfc3339(entry.published.trim())
        .map_err(|e| Error::Malformed(format!("published '{}': {e}", entry.published)))?
        .date_naive();

    Ok(Some(AbstractRecord {
        title: entry.title.trim().replace('\n', " "),
        abstract_text: normalize_abstract(entry.summary.trim()),
        published,
        url: format!("{abs_url_base}{article_id}"),
    }))
}

/// Looks up abstracts by arXiv identifier.
#[derive(Debug)]
pub struct AbstractFetcher<T, S> {
    retry: RetryFetch<T, S>,
    endpoint: Url,
    abs_url_base: String,
}

impl<T, S> AbstractFetcher<T, S>
where
    T: FetchAsync,
    S: Sleep,
{
    pub fn new(retry: RetryFetch<T, S>, endpoint: Url, abs_url_base: impl Into<String>) -> Self {
        Self {
            retry,
            endpoint,
            abs_url_base: abs_url_base.into(),
        }
    }

    fn query_url(&self, article_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id_list", article_id);
        url
    }

    /// Fetch the abstract of `article_id`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCriteria`] for a malformed id (no request is made),
    /// [`Error::Fetch`] for non-retryable HTTP failures, [`Error::Malformed`]
    /// when the feed cannot be parsed.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_abstract(&self, article_id: &str) -> Result<AbstractLookup> {
        let article_id = validate_article_id(article_id)?;
        info!("Fetching article");

        let body = match self.retry.fetch(&self.query_url(article_id)).await {
            Ok(body) => body,
            Err(FetchError::Exhausted { attempts }) => {
                warn!(attempts, "arXiv stayed unavailable; reporting not found");
                return Ok(AbstractLookup::NotFound);
            }
            Err(e) => return Err(e.into()),
        };
        debug!(bytes = body.len(), "Received Atom feed");

        Ok(match parse_feed(&body, article_id, &self.abs_url_base)? {
            Some(record) => AbstractLookup::Found(record),
            None => AbstractLookup::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use crate::api::testing::{RecordingSleep, ScriptedFetch};
    use chrono::NaiveDate;
    use std::time::Duration;

    const ABS: &str = "http://www.arxiv.org/abs/";

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?id_list=2205.00001" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: id_list=2205.00001</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2022-05-13T00:00:00-04:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/2205.00001v1</id>
    <updated>2022-05-11T17:59:59Z</updated>
    <published>2022-05-11T17:59:59Z</published>
    <title>A Comprehensive Overview of
  Large Language Models</title>
    <summary>  Large Language Models have recently demonstrated remarkable
capabilities.
This review is a quick reference for researchers.
</summary>
    <author><name>Jane Doe</name></author>
    <author><name>John Roe</name></author>
    <link href="http://arxiv.org/abs/2205.00001v1" rel="alternate" type="text/html"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: id_list=9999.99999</title>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_9999.99999</id>
    <title>Error</title>
    <summary>incorrect id format for 9999.99999</summary>
    <updated>2022-05-13T00:00:00-04:00</updated>
  </entry>
</feed>"#;

    const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: id_list=2205.99999</title>
</feed>"#;

    fn fetcher<'a>(
        transport: &'a ScriptedFetch,
        sleeper: &'a RecordingSleep,
    ) -> AbstractFetcher<&'a ScriptedFetch, &'a RecordingSleep> {
        AbstractFetcher::new(
            RetryFetch::new(transport, sleeper, RetryPolicy::default()),
            Url::parse("http://export.arxiv.org/api/query").unwrap(),
            ABS,
        )
    }

    fn expected() -> AbstractRecord {
        AbstractRecord {
            title: "A Comprehensive Overview of   Large Language Models".to_string(),
            abstract_text: "Large Language Models have recently demonstrated remarkablecapabilities.\n\nThis review is a quick reference for researchers.".to_string(),
            published: NaiveDate::from_ymd_opt(2022, 5, 11).unwrap(),
            url: "http://www.arxiv.org/abs/2205.00001".to_string(),
        }
    }

    #[test]
    fn test_parse_feed() {
        let record = parse_feed(FEED, "2205.00001", ABS).unwrap().unwrap();
        assert_eq!(record, expected());
    }

    #[test]
    fn test_parse_feed_error_and_empty() {
        assert!(parse_feed(ERROR_FEED, "9999.99999", ABS).unwrap().is_none());
        assert!(parse_feed(EMPTY_FEED, "2205.99999", ABS).unwrap().is_none());
    }

    #[test]
    fn test_parse_feed_bad_published_is_malformed() {
        let xml = FEED.replace("<published>2022-05-11T17:59:59Z</published>", "<published>yesterday</published>");
        assert!(matches!(parse_feed(&xml, "2205.00001", ABS), Err(Error::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_abstract_first_try() {
        let transport = ScriptedFetch::new(vec![Ok(FEED.to_string())]);
        let sleeper = RecordingSleep::default();

        let lookup = fetcher(&transport, &sleeper).fetch_abstract("2205.00001").await.unwrap();
        assert_eq!(lookup, AbstractLookup::Found(expected()));
        assert_eq!(
            transport.requests(),
            vec!["http://export.arxiv.org/api/query?id_list=2205.00001"]
        );
    }

    #[tokio::test]
    async fn test_fetch_abstract_after_three_unavailable() {
        let transport = ScriptedFetch::new(vec![
            ScriptedFetch::unavailable(Some(1)),
            ScriptedFetch::unavailable(None),
            ScriptedFetch::unavailable(Some(4)),
            Ok(FEED.to_string()),
        ]);
        let sleeper = RecordingSleep::default();

        let lookup = fetcher(&transport, &sleeper).fetch_abstract("2205.00001").await.unwrap();
        assert_eq!(lookup, AbstractLookup::Found(expected()));
        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_secs(1), Duration::from_secs(30), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn test_fetch_abstract_not_found_after_five_unavailable() {
        let transport = ScriptedFetch::new((0..5).map(|_| ScriptedFetch::unavailable(None)).collect());
        let sleeper = RecordingSleep::default();

        let lookup = fetcher(&transport, &sleeper).fetch_abstract("2205.00001").await.unwrap();
        assert_eq!(lookup, AbstractLookup::NotFound);
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_abstract_fatal_status_propagates() {
        let transport = ScriptedFetch::new(vec![Err(FetchError::Status(500))]);
        let sleeper = RecordingSleep::default();

        let err = fetcher(&transport, &sleeper).fetch_abstract("2205.00001").await.unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Status(500))));
    }

    #[tokio::test]
    async fn test_fetch_abstract_error_entry_is_not_found() {
        let transport = ScriptedFetch::new(vec![Ok(ERROR_FEED.to_string())]);
        let sleeper = RecordingSleep::default();

        let lookup = fetcher(&transport, &sleeper).fetch_abstract("9999.99999").await.unwrap();
        assert_eq!(lookup, AbstractLookup::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_abstract_rejects_bad_id_without_request() {
        let transport = ScriptedFetch::new(vec![]);
        let sleeper = RecordingSleep::default();

        let err = fetcher(&transport, &sleeper).fetch_abstract("not an id").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCriteria(_)));
        assert!(transport.requests().is_empty());
    }
}
