// src/services/extractor.rs
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::models::{RawRow, Ticker};
use super::browser::{BrowserPage, BrowserSession, Result};

pub const SOURCE_BASE_URL: &str = "https://statusinvest.com.br/fundos-imobiliarios";
pub const EARNING_SECTION_SELECTOR: &str = "#earning-section";
const DIVIDEND_TABLE_SELECTOR: &str = "div#earning-section table";

pub fn source_url(ticker: &Ticker) -> String {
    format!("{}/{}", SOURCE_BASE_URL, ticker)
}

/// Load the ticker's page in a fresh tab and parse its dividend table.
///
/// Returns `Ok(None)` when the page has no dividend table. The tab is closed
/// whether or not the extraction succeeded.
pub async fn extract_dividends(
    browser: &dyn BrowserSession,
    ticker: &Ticker,
    timeout: Duration,
) -> Result<Option<Vec<RawRow>>> {
    let url = source_url(ticker);
    info!("Fetching dividend table for {} from {}", ticker, url);

    let page = browser.new_page().await?;
    if let Err(e) = page.enable_stealth().await {
        warn!("Stealth setup failed for {}, continuing without it: {}", ticker, e);
    }
    let result = load_and_parse(&*page, &url, timeout).await;

    if let Err(e) = page.close().await {
        warn!("Failed to close tab for {}: {}", ticker, e);
    }

    result
}

async fn load_and_parse(
    page: &dyn BrowserPage,
    url: &str,
    timeout: Duration,
) -> Result<Option<Vec<RawRow>>> {
    tokio::time::timeout(timeout, page.goto(url))
        .await
        .map_err(|_| format!("Timed out after {:?} navigating to {}", timeout, url))??;

    page.wait_for_selector(EARNING_SECTION_SELECTOR, timeout).await?;

    let html = page.content().await?;
    debug!("Loaded {} bytes of HTML from {}", html.len(), url);

    Ok(parse_dividend_table(&html))
}

/// Parse the first table inside `#earning-section` into header-keyed rows.
pub fn parse_dividend_table(html: &str) -> Option<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse(DIVIDEND_TABLE_SELECTOR).unwrap();
    let header_selector = Selector::parse("thead th").unwrap();
    let row_selector = Selector::parse("tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let table = document.select(&table_selector).next()?;

    let headers: Vec<String> = table.select(&header_selector).map(cell_text).collect();

    let rows = table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .zip(headers.iter())
                .filter(|(_, header)| !header.is_empty())
                .map(|(cell, header)| (header.clone(), cell_text(cell)))
                .collect::<RawRow>()
        })
        .collect();

    Some(rows)
}

/// Rendered text of a cell: whitespace runs collapsed, then trimmed.
fn cell_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
