// src/source/ico.rs

//! ICO website source adapter.
//!
//! Walks the enforcement action list page, then each linked action page,
//! and extracts the raw text fields the normalizer needs. Parsing is kept
//! in pure functions over fetched HTML so it can be tested offline.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{RawRecord, SourceConfig};
use crate::source::EnforcementSource;
use crate::utils::resolve_url;

/// Map an ICO URL slug to an action kind.
fn kind_from_slug(slug: &str) -> Option<&'static str> {
    match slug {
        "enforcement-notices" => Some("enforcement-notice"),
        "mpns" => Some("monetary-penalty"),
        "undertakings" => Some("undertaking"),
        _ => None,
    }
}

/// Source adapter for the ICO enforcement action list.
pub struct IcoSource {
    config: SourceConfig,
    client: Client,
}

impl IcoSource {
    /// Create a new source with the given configuration.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl EnforcementSource for IcoSource {
    async fn fetch_candidates(&self) -> Result<Vec<RawRecord>> {
        let list_url = self.config.list_url();
        let list_html = self.fetch_text(&list_url).await?;
        let pages = parse_list_page(&list_html, &list_url)?;
        log::info!("Found {} action pages on {}", pages.len(), list_url);

        let delay = Duration::from_millis(self.config.request_delay_ms);
        let concurrency = self.config.max_concurrent.max(1);

        // Buffered (not unordered) so candidates keep the list page order.
        let mut records = Vec::with_capacity(pages.len());
        let mut page_stream = stream::iter(pages)
            .map(|url| async move {
                let html = self.fetch_text(&url).await?;
                parse_action_page(&html, &url)
            })
            .buffered(concurrency);

        while let Some(result) = page_stream.next().await {
            records.push(result?);
            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(records)
    }
}

/// Extract the action page URLs from the list page, in page order.
fn parse_list_page(html: &str, list_url: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_sel = parse_selector(r#"a[href*="/action-weve-taken/enforcement/"]"#)?;
    let base = Url::parse(list_url)?;

    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    for anchor in document.select(&link_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let absolute = resolve_url(&base, href);
        // The list page links to itself from pagination and breadcrumbs.
        if absolute.trim_end_matches('/') == list_url.trim_end_matches('/') {
            continue;
        }
        if seen.insert(absolute.clone()) {
            pages.push(absolute);
        }
    }

    if pages.is_empty() {
        return Err(AppError::fetch(
            list_url,
            "no enforcement action links found on list page",
        ));
    }
    Ok(pages)
}

/// Extract the raw fields from one action page.
fn parse_action_page(html: &str, page_url: &str) -> Result<RawRecord> {
    let document = Html::parse_document(html);
    let mut raw = RawRecord::new();
    raw.set("url", page_url);

    let title_sel = parse_selector("h1")?;
    if let Some(h1) = document.select(&title_sel).next() {
        raw.set("title", h1.text().collect::<String>());
    }

    // The date sits in a definition list: <dt>Date</dt><dd>21 December 2017</dd>
    let dt_sel = parse_selector("dt")?;
    for dt in document.select(&dt_sel) {
        let label: String = dt.text().collect();
        if !label.contains("Date") {
            continue;
        }
        if let Some(dd) = following_dd(&dt) {
            raw.set("date", dd.text().collect::<String>());
        }
        break;
    }

    let para_sel = parse_selector(r#"div[class*="article-content"] p"#)?;
    if let Some(paragraph) = document.select(&para_sel).next() {
        raw.set("description", paragraph.text().collect::<String>());
    }

    // Linked decision PDF, when the page has one
    let pdf_sel =
        parse_selector(r#"div[class*="resultlist"] a[href*="/media/action-weve-taken"][href$=".pdf"]"#)?;
    let pdf_links: Vec<_> = document.select(&pdf_sel).collect();
    if pdf_links.len() > 1 {
        log::warn!("Multiple PDF links on {}, using the first", page_url);
    }
    match pdf_links.first().and_then(|a| a.value().attr("href")) {
        Some(href) => {
            let base = Url::parse(page_url)?;
            let pdf_url = resolve_url(&base, href);
            if let Some(id) = extract_pdf_id(&pdf_url) {
                raw.set("pdf_id", id);
            }
            if let Some(kind) = extract_kind(&pdf_url) {
                raw.set("kind", kind);
            }
            raw.set("pdf_url", pdf_url);
        }
        None => log::debug!("No PDF link on {}", page_url),
    }

    Ok(raw)
}

/// First `dd` element following a `dt`, skipping text nodes between them.
fn following_dd<'a>(dt: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    for sibling in dt.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            if element.value().name() == "dd" {
                return Some(element);
            }
        }
    }
    None
}

/// Extract the numeric document id from a PDF URL.
fn extract_pdf_id(pdf_url: &str) -> Option<String> {
    let pattern = regex::Regex::new(r"/(\d+)/").ok()?;
    pattern
        .captures(pdf_url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Extract the action kind from a PDF URL slug.
fn extract_kind(pdf_url: &str) -> Option<&'static str> {
    let pattern = regex::Regex::new(r"/action-weve-taken/([^/]+)/").ok()?;
    pattern
        .captures(pdf_url)
        .and_then(|caps| caps.get(1))
        .and_then(|slug| kind_from_slug(slug.as_str()))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
