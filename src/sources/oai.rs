//! arXiv OAI-PMH harvester.
//!
//! Lists records of one archive set (e.g. `cs`) through the
//! [OAI-PMH interface](https://info.arxiv.org/help/oa/index.html) using the
//! `arXiv` metadata format, which carries `created`/`updated` dates and
//! space-delimited categories.
//!
//! # Paging
//!
//! The first request carries `from`/`until`/`set`; each response may end with a
//! `resumptionToken`, and the next request carries only that token. An empty or
//! missing token ends the harvest.

use super::RecordSource;
use crate::api::{FetchAsync, RetryFetch, Sleep};
use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use crate::text::collapse_whitespace;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

const METADATA_PREFIX: &str = "arXiv";

#[derive(Debug, Deserialize)]
struct OaiResponse {
    #[serde(rename = "ListRecords")]
    list_records: Option<ListRecords>,
    error: Option<OaiError>,
}

#[derive(Debug, Deserialize)]
struct OaiError {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$text", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListRecords {
    #[serde(rename = "record", default)]
    records: Vec<OaiRecord>,
    #[serde(rename = "resumptionToken")]
    resumption_token: Option<ResumptionToken>,
}

#[derive(Debug, Deserialize)]
struct ResumptionToken {
    #[serde(rename = "$text", default)]
    token: String,
}

/// Deleted records come without `metadata`.
#[derive(Debug, Deserialize)]
struct OaiRecord {
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(rename = "arXiv")]
    arxiv: ArxivMetadata,
}

#[derive(Debug, Deserialize)]
struct ArxivMetadata {
    id: String,
    created: String,
    updated: Option<String>,
    #[serde(default)]
    authors: Authors,
    title: String,
    categories: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Authors {
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    keyname: String,
    forenames: Option<String>,
}

impl Author {
    fn display_name(&self) -> String {
        match self.forenames.as_deref().map(str::trim) {
            Some(forenames) if !forenames.is_empty() => format!("{} {}", forenames, self.keyname.trim()),
            _ => self.keyname.trim().to_string(),
        }
    }
}

/// One parsed `ListRecords` response.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<ArticleRecord>,
    pub resumption_token: Option<String>,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Malformed(format!("{field} date '{value}': {e}")))
}

impl ArxivMetadata {
    fn into_record(self, abs_url_base: &str) -> Result<ArticleRecord> {
        let created = parse_date("created", &self.created)?;
        let updated = self
            .updated
            .as_deref()
            .map(|u| parse_date("updated", u))
            .transpose()?;
        let id = self.id.trim().to_string();
        Ok(ArticleRecord {
            url: format!("{abs_url_base}{id}"),
            title: collapse_whitespace(&self.title),
            categories: self
                .categories
                .split_whitespace()
                .unique()
                .map(str::to_string)
                .collect(),
            abstract_text: collapse_whitespace(&self.abstract_text),
            authors: self.authors.authors.iter().map(Author::display_name).collect(),
            created,
            updated,
            id,
        })
    }
}

/// Parse one `ListRecords` response body.
///
/// `noRecordsMatch` is an empty page; any other OAI error is [`Error::Malformed`].
pub fn parse_list_records(xml: &str, abs_url_base: &str) -> Result<Page> {
    let response: OaiResponse = quick_xml::de::from_str(xml)?;

    if let Some(err) = response.error {
        if err.code == "noRecordsMatch" {
            debug!("OAI reported noRecordsMatch");
            return Ok(Page::default());
        }
        return Err(Error::Malformed(format!(
            "OAI error {}: {}",
            err.code,
            err.message.trim()
        )));
    }

    let Some(list) = response.list_records else {
        return Err(Error::Malformed("response has neither ListRecords nor error".into()));
    };

    let records = list
        .records
        .into_iter()
        .filter_map(|r| r.metadata)
        .map(|m| m.arxiv.into_record(abs_url_base))
        .collect::<Result<Vec<_>>>()?;

    let resumption_token = list
        .resumption_token
        .map(|t| t.token.trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(Page {
        records,
        resumption_token,
    })
}

/// [`RecordSource`] backed by the arXiv OAI-PMH endpoint.
#[derive(Debug)]
pub struct OaiSource<T, S> {
    retry: RetryFetch<T, S>,
    endpoint: Url,
    set: String,
    abs_url_base: String,
}

impl<T, S> OaiSource<T, S>
where
    T: FetchAsync,
    S: Sleep,
{
    pub fn new(retry: RetryFetch<T, S>, endpoint: Url, set: impl Into<String>, abs_url_base: impl Into<String>) -> Self {
        Self {
            retry,
            endpoint,
            set: set.into(),
            abs_url_base: abs_url_base.into(),
        }
    }

    fn first_page_url(&self, date_from: NaiveDate, date_until: NaiveDate) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("verb", "ListRecords")
            .append_pair("metadataPrefix", METADATA_PREFIX)
            .append_pair("set", &self.set)
            .append_pair("from", &date_from.format("%Y-%m-%d").to_string())
            .append_pair("until", &date_until.format("%Y-%m-%d").to_string());
        url
    }

    fn next_page_url(&self, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("verb", "ListRecords")
            .append_pair("resumptionToken", token);
        url
    }
}

impl<T, S> RecordSource for OaiSource<T, S>
where
    T: FetchAsync,
    S: Sleep,
{
    #[instrument(level = "info", skip(self), fields(set = %self.set))]
    async fn fetch_records(&self, date_from: NaiveDate, date_until: NaiveDate) -> Result<Vec<ArticleRecord>> {
        let mut url = self.first_page_url(date_from, date_until);
        let mut records = Vec::new();
        let mut pages = 0usize;

        loop {
            let body = self.retry.fetch(&url).await?;
            let page = parse_list_records(&body, &self.abs_url_base)?;
            pages += 1;
            debug!(page = pages, count = page.records.len(), "Harvested OAI page");
            records.extend(page.records);

            match page.resumption_token {
                Some(token) => {
                    let next = self.next_page_url(&token);
                    if next == url {
                        warn!(%token, "OAI repeated its resumption token; stopping harvest");
                        break;
                    }
                    url = next;
                }
                None => break,
            }
        }

        info!(count = records.len(), pages, "Scraped articles");
        Ok(records)
    }
}
