//! Plain-text rendering for the terminal.

use crate::models::{AbstractLookup, FilteredArticle};
use crate::text::{capitalize, first_and_last_sentence};
use std::fmt::Write;

pub const EMPTY_RESULT_HINT: &str = "No articles matched. Try broadening your search.";
pub const NOT_FOUND: &str = "Article not found.";

/// Render a scrape result, one numbered block per article.
pub fn render_articles(articles: &[FilteredArticle]) -> String {
    if articles.is_empty() {
        return format!("{EMPTY_RESULT_HINT}\n");
    }

    let mut out = String::new();
    for entry in articles {
        let a = &entry.article;
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "{}. {}\nPublication date: {}\nLink: {}\nID: {}\nAbstract:\n  {}\n\n",
            entry.index + 1,
            capitalize(&a.title),
            a.created,
            a.url,
            a.id,
            first_and_last_sentence(&a.abstract_text),
        );
    }
    out
}

/// Render an abstract lookup.
pub fn render_abstract(lookup: &AbstractLookup) -> String {
    match lookup {
        AbstractLookup::NotFound => format!("{NOT_FOUND}\n"),
        AbstractLookup::Found(record) => format!(
            "{}\nLink: {}\nDate: {}\nFull abstract:\n{}\n",
            record.title, record.url, record.published, record.abstract_text
        ),
    }
}
