// src/extraction/text_extractor.rs
use super::page::LivePage;
use super::JobDescription;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT_MS: u64 = 6000;
pub const UNTITLED_JOB: &str = "Untitled Job";

const TITLE_SELECTORS: [&str; 2] = ["h1", "h1 a"];

const CONTAINER_SELECTORS: [&str; 2] = [".show-more-less-html__markup", "#job-details"];

const TEXT_NODE_SELECTOR: &str = "span";

const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

#[derive(Debug, Clone)]
pub struct TextExtractor {
    timeout: Duration,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Title and body of the posting currently shown on `page`.
    pub async fn extract_job_description(&self, page: &LivePage) -> JobDescription {
        let title = Self::extract_title(&page.document());
        let text = Self::wait_for_body(page, self.timeout).await;

        info!(
            "Extracted job '{}' from {} ({} chars)",
            title,
            page.url(),
            text.len()
        );

        JobDescription { title, text }
    }

    pub fn extract_title(document: &Html) -> String {
        for selector_str in &TITLE_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text = element.text().collect::<String>().trim().to_string();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
        UNTITLED_JOB.to_string()
    }

    /// Single synchronous scan of the description container.
    pub fn extract_body_now(document: &Html) -> String {
        let Some(container) = Self::find_container(document) else {
            return String::new();
        };

        let pieces: Vec<String> = match Selector::parse(TEXT_NODE_SELECTOR) {
            Ok(selector) => container
                .select(&selector)
                .map(|node| node.text().collect::<String>().trim().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };

        if pieces.is_empty() {
            return Self::visible_text(container);
        }

        pieces
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Resolve with the body text as soon as it is available, or `""` once
    /// `timeout` elapses. The page observer never outlives this call.
    pub async fn wait_for_body(page: &LivePage, timeout: Duration) -> String {
        // Register before the first attempt so no mutation slips in between.
        let mut observer = page.observe();

        let first_try = Self::extract_body_now(&page.document());
        if !first_try.is_empty() {
            return first_try;
        }

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                changed = observer.changed() => {
                    if !changed {
                        debug!("Page {} closed while waiting for job text", page.url());
                        return String::new();
                    }
                    let text = Self::extract_body_now(&page.document());
                    if !text.is_empty() {
                        return text;
                    }
                }
                _ = &mut deadline => {
                    debug!(
                        "No job text on {} after {}ms",
                        page.url(),
                        timeout.as_millis()
                    );
                    return String::new();
                }
            }
        }
    }

    fn find_container(document: &Html) -> Option<ElementRef<'_>> {
        CONTAINER_SELECTORS.iter().find_map(|selector_str| {
            Selector::parse(selector_str)
                .ok()
                .and_then(|selector| document.select(&selector).next())
        })
    }

    fn visible_text(element: ElementRef<'_>) -> String {
        let raw = element
            .descendants()
            .filter_map(|node| {
                let text: &str = node.value().as_text()?;
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
                (!hidden).then(|| text.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self::clean_text(&raw)
    }

    fn clean_text(text: &str) -> String {
        text.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
