//! HTTP client for the upstream search service and the sequential
//! page-fetch loop used by the grouped pipeline.
//!
//! Pages are requested strictly one at a time: the next page is only
//! asked for once the previous response body has been read in full. The
//! loop stops on the first empty page, or at a hard page-index cap, in
//! which case the accumulated set is reported as truncated rather than
//! silently passed off as complete.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::models::RawRecord;

/// Page size for grouped fetches. The upstream service caps `limit` at
/// 250, so asking for more just wastes a parameter.
pub const GROUP_PAGE_LIMIT: u32 = 250;

/// Highest page index the fetch loop will request. Index 0 through 20
/// inclusive, so at most 21 pages per grouped query.
pub const PAGE_INDEX_CAP: u32 = 20;

/// Client for the upstream search endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    origin: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            origin: config.origin.clone(),
        })
    }

    /// Fetch one page of JSON search results.
    ///
    /// Caller-supplied parameters pass through unchanged except for
    /// `outputAs`, `limit` and `pageNum`, which are always overridden so
    /// the pagination loop stays in control of what it is iterating.
    pub async fn fetch_page(
        &self,
        params: &[(String, String)],
        limit: u32,
        page_num: u32,
    ) -> Result<Vec<RawRecord>> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "outputAs" | "limit" | "pageNum"))
            .cloned()
            .collect();
        query.push(("outputAs".to_string(), "json".to_string()));
        query.push(("limit".to_string(), limit.to_string()));
        query.push(("pageNum".to_string(), page_num.to_string()));

        self.fetch_json(&query).await
    }

    /// Fetch a single page of JSON results with the caller's own `limit`
    /// and `pageNum` left intact. Only `outputAs` is forced.
    pub async fn fetch_results(&self, params: &[(String, String)]) -> Result<Vec<RawRecord>> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| key.as_str() != "outputAs")
            .cloned()
            .collect();
        query.push(("outputAs".to_string(), "json".to_string()));

        self.fetch_json(&query).await
    }

    /// Fetch the HTML rendering of the same query, parameters verbatim.
    ///
    /// The HTML page is the only place the upstream service reports a
    /// total match count, so the regular pipeline requests it alongside
    /// the JSON results.
    pub async fn fetch_html(&self, params: &[(String, String)]) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/search", self.origin))
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Search request to {} failed", self.origin))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Upstream search returned {}", status);
        }

        response
            .text()
            .await
            .context("Failed to read upstream response body")
    }

    async fn fetch_json(&self, query: &[(String, String)]) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .get(format!("{}/search", self.origin))
            .query(&query)
            .header("accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Search request to {} failed", self.origin))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Upstream search returned {}", status);
        }

        response
            .json::<Vec<RawRecord>>()
            .await
            .context("Upstream search returned malformed JSON")
    }

    /// Page source over `GET /search` for [`collect_pages`].
    pub fn pages<'a>(&'a self, params: &'a [(String, String)], limit: u32) -> SearchPages<'a> {
        SearchPages {
            client: self,
            params,
            limit,
        }
    }
}

/// Anything that can serve numbered pages of search records.
///
/// The live implementation is [`SearchPages`]; tests drive the fetch
/// loop with scripted sources instead of a network.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page_num: u32) -> Result<Vec<RawRecord>>;
}

/// [`PageSource`] backed by an [`UpstreamClient`] and a fixed query.
pub struct SearchPages<'a> {
    client: &'a UpstreamClient,
    params: &'a [(String, String)],
    limit: u32,
}

#[async_trait]
impl PageSource for SearchPages<'_> {
    async fn fetch_page(&self, page_num: u32) -> Result<Vec<RawRecord>> {
        self.client.fetch_page(self.params, self.limit, page_num).await
    }
}

/// Everything the fetch loop accumulated, plus how it stopped.
#[derive(Debug)]
pub struct PagedRecords {
    pub records: Vec<RawRecord>,
    pub pages_fetched: u32,
    /// True when the loop hit the page cap with the last page still
    /// full, so more matches likely exist upstream.
    pub truncated: bool,
}

/// Drain a [`PageSource`] page by page, in order, starting at page 0.
///
/// Stops on the first empty page (natural exhaustion) or once the page
/// index would exceed [`PAGE_INDEX_CAP`] (truncation). Any fetch error
/// aborts the whole collection; there is no partial-result fallback.
pub async fn collect_pages(source: &dyn PageSource) -> Result<PagedRecords> {
    let mut records: Vec<RawRecord> = Vec::new();
    let mut pages_fetched = 0u32;
    let mut truncated = false;
    let mut page_num = 0u32;

    loop {
        if page_num > PAGE_INDEX_CAP {
            tracing::warn!(
                pages = pages_fetched,
                records = records.len(),
                "page cap reached, result set is truncated"
            );
            truncated = true;
            break;
        }

        let page = source.fetch_page(page_num).await?;
        pages_fetched += 1;
        if page.is_empty() {
            break;
        }

        tracing::debug!(page = page_num, records = page.len(), "fetched result page");
        records.extend(page);
        page_num += 1;
    }

    Ok(PagedRecords {
        records,
        pages_fetched,
        truncated,
    })
}
