use std::time::Duration;

use scraper::{Html, Selector};
use tokio::time::Instant;

use crate::SourceError;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A loaded page: its requested URL (fragment included) and document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Parse the page into a queryable tree. The tree is not `Send`; keep it
    /// out of `.await` points.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        self.document().select(selector).next().is_some()
    }
}

pub fn parse_selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|err| SourceError::InvalidSelector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}

/// Renders a URL into a queryable element tree.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load(&self, url: &str) -> Result<Page, SourceError>;

    /// Delay between reloads in [`DocumentSource::wait_for`].
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Load `url` until an element matching `selector` is present, bounded by
    /// `timeout`. A load that is still running at the deadline counts as a
    /// timeout.
    async fn wait_for(
        &self,
        url: &str,
        selector: &str,
        timeout: Duration,
    ) -> Result<Page, SourceError> {
        let css = parse_selector(selector)?;
        let deadline = Instant::now() + timeout;
        let timed_out = || SourceError::Timeout {
            selector: selector.to_string(),
            waited: timeout,
        };

        loop {
            let page = match tokio::time::timeout_at(deadline, self.load(url)).await {
                Ok(result) => result?,
                Err(_) => return Err(timed_out()),
            };
            if page.matches(&css) {
                return Ok(page);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timed_out());
            }
            let pause = self.poll_interval().min(deadline - now);
            tokio::time::sleep(pause).await;
        }
    }
}

/// Creates independent Document Source instances, one per worker.
pub trait SourceFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn DocumentSource>, SourceError>;
}
