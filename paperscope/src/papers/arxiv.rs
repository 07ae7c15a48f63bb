//! arXiv export API client.
//!
//! The API answers with an Atom feed; each `<entry>` becomes one [`Paper`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::utils::{arxiv_id_from_entry_id, clean_summary, pdf_url_from_entry_id};
use super::{Paper, PaperSource};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "http://export.arxiv.org";
const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_ATTEMPTS: usize = 3;
const DEFAULT_DELAY: Duration = Duration::from_secs(3);

pub struct ArxivClient {
    base_url: String,
    client: Client,
    page_size: usize,
    attempts: usize,
    delay: Duration,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
            page_size: DEFAULT_PAGE_SIZE,
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }

    /// Attempts per page (at least one) and the pause between requests.
    pub fn with_retry(mut self, attempts: usize, delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.delay = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn query_url(&self, topic: &str, start: usize, max_results: usize) -> Result<Url> {
        let endpoint = format!("{}/api/query", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[
                ("search_query", topic),
                ("start", &start.to_string()),
                ("max_results", &max_results.to_string()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ],
        )
        .map_err(|e| Error::Fetch(format!("invalid arXiv url {}: {}", endpoint, e)))
    }

    /// One page, retried on transport errors, bad statuses and spurious
    /// empty pages.
    async fn fetch_page(&self, topic: &str, start: usize, size: usize) -> Result<Feed> {
        let url = self.query_url(topic, start, size)?;
        let mut attempt = 1;
        loop {
            debug!(%url, attempt, "Querying arXiv");
            match self.try_page(url.clone(), start).await {
                Ok(feed) => return Ok(feed),
                Err(e @ (Error::Fetch(_) | Error::Http(_))) if attempt < self.attempts => {
                    warn!("arXiv attempt {}/{} failed: {}", attempt, self.attempts, e);
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_page(&self, url: Url, start: usize) -> Result<Feed> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Fetch(format!("arXiv returned {}: {}", status, body)));
        }

        let feed = parse_feed(&body)?;
        let more_expected = feed.total_results.map_or(start > 0, |total| total > start);
        if feed.papers.is_empty() && more_expected {
            return Err(Error::Fetch(format!("arXiv returned an empty page at offset {}", start)));
        }
        Ok(feed)
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>> {
        let mut papers = Vec::new();
        let mut start = 0;

        while papers.len() < max_results {
            if start > 0 {
                // arXiv asks clients to space consecutive requests
                tokio::time::sleep(self.delay).await;
            }
            let size = self.page_size.min(max_results - papers.len());
            let feed = self.fetch_page(topic, start, size).await?;

            let received = feed.papers.len();
            papers.extend(feed.papers);
            start += received;

            let exhausted = match feed.total_results {
                Some(total) => start >= total,
                None => received < size,
            };
            if received == 0 || exhausted {
                break;
            }
        }

        papers.truncate(max_results);
        info!("Fetched {} papers for topic: {}", papers.len(), topic);
        Ok(papers)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    pdf_url: Option<String>,
    primary_category: Option<String>,
    categories: Vec<String>,
}

impl EntryBuilder {
    fn push_text(&mut self, field: Field, text: &str) {
        match field {
            Field::Id => self.id.push_str(text),
            Field::Title => self.title.push_str(text),
            Field::Summary => self.summary.push_str(text),
            Field::Published => self.published.push_str(text),
            Field::AuthorName => match self.authors.last_mut() {
                Some(name) => name.push_str(text),
                None => self.authors.push(text.to_string()),
            },
        }
    }

    /// `<link>`, `<category>` and `<arxiv:primary_category>` carry their data
    /// in attributes.
    fn apply_attributes(&mut self, element: &BytesStart<'_>) -> Result<()> {
        let local = element.local_name();
        let mut term = None;
        let mut href = None;
        let mut title = None;

        for attr in element.attributes() {
            let attr = attr.map_err(|e| Error::Parse(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_owned();
            match attr.key.local_name().as_ref() {
                b"term" => term = Some(value),
                b"href" => href = Some(value),
                b"title" => title = Some(value),
                _ => {}
            }
        }

        match local.as_ref() {
            b"link" if title.as_deref() == Some("pdf") => self.pdf_url = href,
            b"primary_category" => self.primary_category = term,
            b"category" => self.categories.extend(term),
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> Paper {
        let published = DateTime::parse_from_rfc3339(self.published.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc).to_rfc3339());
        let pdf_url = self
            .pdf_url
            .unwrap_or_else(|| pdf_url_from_entry_id(&self.id));
        let primary_category = self
            .primary_category
            .or_else(|| self.categories.into_iter().next())
            .unwrap_or_default();

        Paper {
            title: clean_summary(&self.title),
            authors: self.authors.iter().map(|a| clean_summary(a)).collect(),
            summary: clean_summary(&self.summary),
            arxiv_id: arxiv_id_from_entry_id(&self.id),
            published,
            pdf_url,
            primary_category,
        }
    }
}

/// One page of an arXiv Atom feed.
#[derive(Debug, Default)]
pub struct Feed {
    /// `opensearch:totalResults`, the size of the whole result set.
    pub total_results: Option<usize>,
    pub papers: Vec<Paper>,
}

/// Parse an arXiv Atom feed into normalized paper records, in feed order.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut feed = Feed::default();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    let mut in_author = false;
    let mut in_total = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"entry" => entry = Some(EntryBuilder::default()),
                b"totalResults" if entry.is_none() => in_total = true,
                b"author" => in_author = true,
                b"id" => field = Some(Field::Id),
                b"title" => field = Some(Field::Title),
                b"summary" => field = Some(Field::Summary),
                b"published" => field = Some(Field::Published),
                b"name" if in_author => {
                    if let Some(entry) = entry.as_mut() {
                        entry.authors.push(String::new());
                    }
                    field = Some(Field::AuthorName);
                }
                _ => {
                    if let Some(entry) = entry.as_mut() {
                        entry.apply_attributes(&e)?;
                    }
                }
            },
            Ok(Event::Empty(e)) => {
                if let Some(entry) = entry.as_mut() {
                    entry.apply_attributes(&e)?;
                }
            }
            Ok(Event::Text(text)) if in_total => {
                let text = text.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                feed.total_results = text.trim().parse().ok();
            }
            Ok(Event::Text(text)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                    let text = text.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    entry.push_text(field, &text);
                }
            }
            Ok(Event::CData(data)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                    let raw = data.into_inner();
                    entry.push_text(field, &String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"entry" => {
                        if let Some(done) = entry.take() {
                            feed.papers.push(done.build());
                        }
                    }
                    b"author" => in_author = false,
                    b"totalResults" => in_total = false,
                    _ => {}
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Parse(format!(
                    "invalid Atom feed at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(feed)
}
