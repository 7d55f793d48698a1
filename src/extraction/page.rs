// src/extraction/page.rs
//! A loaded page whose markup can change after the initial render

use crate::core::FsOps;
use anyhow::Result;
use scraper::Html;
use std::path::Path;
use tokio::sync::watch;
use tracing::debug;

/// Current markup of a page plus the list of its mutation observers.
///
/// Every structural mutation replaces the markup and wakes all observers.
pub struct LivePage {
    url: String,
    markup: watch::Sender<String>,
}

impl LivePage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let (markup, _) = watch::channel(html.into());
        Self {
            url: url.into(),
            markup,
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let html = FsOps::read_text_lossy(path).await?;
        Ok(Self::new(format!("file://{}", path.display()), html))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse the current markup
    pub fn document(&self) -> Html {
        Html::parse_document(&self.markup.borrow())
    }

    /// Replace the whole document
    pub fn set_html(&self, html: impl Into<String>) {
        self.markup.send_replace(html.into());
        debug!("Page {} replaced", self.url);
    }

    /// Insert a fragment at the end of `<body>`, or at the end of the document
    /// when there is no closing body tag.
    pub fn append_html(&self, fragment: &str) {
        self.markup.send_modify(|html| match html.rfind("</body>") {
            Some(pos) => html.insert_str(pos, fragment),
            None => html.push_str(fragment),
        });
        debug!("Page {} mutated", self.url);
    }

    pub fn observe(&self) -> MutationObserver {
        MutationObserver {
            receiver: self.markup.subscribe(),
        }
    }

    /// Number of observers still registered on this page
    pub fn observer_count(&self) -> usize {
        self.markup.receiver_count()
    }
}

/// Registration on a page's mutations. Dropping it disconnects.
pub struct MutationObserver {
    receiver: watch::Receiver<String>,
}

impl MutationObserver {
    /// Wait for the next mutation. Returns `false` once the page is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}
