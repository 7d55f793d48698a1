// src/bridge/tabs.rs
//! Tab registry and the page-side listener that answers bridge requests

use super::messages::BridgeRequest;
use crate::extraction::{LivePage, TextExtractor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type TabId = u32;

const ENDPOINT_QUEUE: usize = 16;

/// One message in flight to a page, with the slot for its reply.
pub struct Envelope {
    pub request: Value,
    pub reply: oneshot::Sender<Option<Value>>,
}

#[async_trait]
pub trait TabChannel: Send + Sync {
    /// Tab currently in the foreground
    async fn active_tab(&self) -> Result<TabId>;

    /// Deliver `request` to the listener in `tab`. `Ok(None)` means the
    /// listener handled the message without answering.
    async fn send_message(&self, tab: TabId, request: &BridgeRequest) -> Result<Option<Value>>;
}

/// Page-side listener: answers requests by running the extractor on its page.
pub struct ContentEndpoint {
    page: Arc<LivePage>,
    extractor: TextExtractor,
}

impl ContentEndpoint {
    pub fn new(page: Arc<LivePage>, extractor: TextExtractor) -> Self {
        Self { page, extractor }
    }

    pub fn page(&self) -> &Arc<LivePage> {
        &self.page
    }

    pub async fn handle(&self, request: &Value) -> Option<Value> {
        debug!("Endpoint on {} got message {}", self.page.url(), request);

        match serde_json::from_value::<BridgeRequest>(request.clone()) {
            Ok(BridgeRequest::GetJobDescription) => {
                let description = self.extractor.extract_job_description(&self.page).await;
                serde_json::to_value(description).ok()
            }
            Ok(BridgeRequest::Unknown) | Err(_) => {
                debug!("Ignoring unsupported message: {}", request);
                None
            }
        }
    }

    /// Serve messages until every sender is gone. Each message is answered
    /// on its own task so a slow extraction does not hold up the queue.
    pub fn spawn(self) -> (mpsc::Sender<Envelope>, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(ENDPOINT_QUEUE);
        let endpoint = Arc::new(self);

        let handle = tokio::spawn(async move {
            info!("Content endpoint listening on {}", endpoint.page.url());
            while let Some(envelope) = receiver.recv().await {
                let endpoint = Arc::clone(&endpoint);
                tokio::spawn(async move {
                    let response = endpoint.handle(&envelope.request).await;
                    if envelope.reply.send(response).is_err() {
                        debug!("Requester went away before the response was sent");
                    }
                });
            }
            debug!("Content endpoint on {} stopped", endpoint.page.url());
        });

        (sender, handle)
    }
}

struct Tab {
    url: String,
    listener: Option<mpsc::Sender<Envelope>>,
}

#[derive(Default)]
struct TabsInner {
    next_id: TabId,
    active: Option<TabId>,
    tabs: HashMap<TabId, Tab>,
}

/// In-process stand-in for the browser's tab set.
#[derive(Default)]
pub struct InProcessTabs {
    inner: Mutex<TabsInner>,
}

impl InProcessTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab without any listener and bring it to the foreground.
    pub fn open_tab(&self, url: impl Into<String>) -> TabId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tabs.insert(
            id,
            Tab {
                url: url.into(),
                listener: None,
            },
        );
        inner.active = Some(id);
        id
    }

    /// Open a tab for `endpoint`'s page, start its listener, and activate it.
    pub fn open_with_endpoint(&self, endpoint: ContentEndpoint) -> (TabId, JoinHandle<()>) {
        let id = self.open_tab(endpoint.page().url());
        let (listener, handle) = endpoint.spawn();
        if let Some(tab) = self.lock().tabs.get_mut(&id) {
            tab.listener = Some(listener);
        }
        (id, handle)
    }

    pub fn activate(&self, id: TabId) -> Result<()> {
        let mut inner = self.lock();
        if !inner.tabs.contains_key(&id) {
            anyhow::bail!("No tab with id: {}", id);
        }
        inner.active = Some(id);
        Ok(())
    }

    pub fn close_tab(&self, id: TabId) {
        let mut inner = self.lock();
        inner.tabs.remove(&id);
        if inner.active == Some(id) {
            inner.active = None;
        }
    }

    pub fn url_of(&self, id: TabId) -> Option<String> {
        self.lock().tabs.get(&id).map(|tab| tab.url.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TabsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TabChannel for InProcessTabs {
    async fn active_tab(&self) -> Result<TabId> {
        self.lock().active.context("No active tab")
    }

    async fn send_message(&self, tab: TabId, request: &BridgeRequest) -> Result<Option<Value>> {
        let listener = {
            let inner = self.lock();
            let entry = inner
                .tabs
                .get(&tab)
                .with_context(|| format!("No tab with id: {}", tab))?;
            entry.listener.clone().context(
                "Could not establish connection. Receiving end does not exist.",
            )?
        };

        let (reply, response) = oneshot::channel();
        let envelope = Envelope {
            request: serde_json::to_value(request).context("Failed to encode message")?,
            reply,
        };

        listener
            .send(envelope)
            .await
            .map_err(|_| anyhow::anyhow!("Receiving end closed before delivery"))?;

        response.await.map_err(|_| {
            warn!("Tab {} dropped the message without replying", tab);
            anyhow::anyhow!("The message port closed before a response was received")
        })
    }
}
