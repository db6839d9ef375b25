use crate::error::{EtlError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

/// A parsed `<table>` with raw cell text. Cell values are kept verbatim,
/// including any embedded newlines the page renders into them; cleanup is the
/// extractor's job.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Port over the document fetch so tests can inject synthetic tables instead
/// of depending on the remote page.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Retrieves all tables from the document at `url`, in document order.
    async fn fetch(&self, url: &str) -> Result<Vec<HtmlTable>>;
}

/// Production fetcher: one reqwest GET per run, no caching, no retry.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpSourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<HtmlTable>> {
        info!("Fetching source document from {}", url);
        let response = self
            .client
            .get(url)
            .header("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36")
            .send()
            .await
            .map_err(|e| EtlError::SourceUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::SourceUnavailable {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }

        let body = response.text().await.map_err(|e| EtlError::SourceUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let tables = parse_tables(&body);
        info!("Parsed {} table(s) from {}", tables.len(), url);
        if tables.is_empty() {
            return Err(EtlError::NoTablesFound {
                url: url.to_string(),
            });
        }
        Ok(tables)
    }
}

/// Extracts every `<table>` from an HTML document, in document order. The
/// first row supplies headers (from `<th>` cells, falling back to `<td>`);
/// remaining rows become data rows.
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();

    let mut tables = Vec::new();
    for table in document.select(&table_selector) {
        let mut row_iter = table.select(&row_selector);
        let headers = match row_iter.next() {
            Some(header_row) => cell_texts(&header_row, true),
            None => Vec::new(),
        };
        let rows: Vec<Vec<String>> = row_iter
            .map(|row| cell_texts(&row, false))
            .filter(|cells| !cells.is_empty())
            .collect();
        tables.push(HtmlTable { headers, rows });
    }
    tables
}

fn cell_texts(row: &ElementRef, prefer_th: bool) -> Vec<String> {
    let th_selector = Selector::parse("th").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    let th_cells: Vec<String> = row
        .select(&th_selector)
        .map(|cell| cell.text().collect::<String>())
        .collect();
    if prefer_th && !th_cells.is_empty() {
        return th_cells;
    }

    let mut cells: Vec<String> = row
        .select(&td_selector)
        .map(|cell| cell.text().collect::<String>())
        .collect();
    if cells.is_empty() {
        // Rows that use <th> for the rank cell only
        cells = th_cells;
    }
    cells
}
