//! In-memory Document Source serving fixed HTML, for fixtures and dry runs.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{DocumentSource, Page, SourceError, SourceFactory};

/// Serves pages from a map keyed by URL. A URL with a fragment falls back to
/// the entry for the same URL without it, like a single-page reference.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pages: Arc<HashMap<String, String>>,
    delay: Duration,
    poll_interval: Duration,
    loads: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), html.into());
        self
    }

    /// Delay every load, to keep workers busy long enough to overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Number of loads served, across all clones made by the factory.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn factory(&self) -> StaticSourceFactory {
        StaticSourceFactory {
            template: self.clone(),
        }
    }

    fn lookup(&self, url: &str) -> Option<&String> {
        self.pages.get(url).or_else(|| {
            let (base, _) = url.split_once('#')?;
            self.pages.get(base)
        })
    }
}

#[async_trait::async_trait]
impl DocumentSource for StaticSource {
    async fn load(&self, url: &str) -> Result<Page, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.lookup(url)
            .map(|html| Page::new(url, html.clone()))
            .ok_or(SourceError::HttpStatus(404))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[derive(Debug, Clone)]
pub struct StaticSourceFactory {
    template: StaticSource,
}

impl SourceFactory for StaticSourceFactory {
    fn create(&self) -> Result<Box<dyn DocumentSource>, SourceError> {
        Ok(Box::new(self.template.clone()))
    }
}
