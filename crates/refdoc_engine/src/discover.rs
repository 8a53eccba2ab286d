use std::collections::HashSet;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use refdoc_core::{HarvestConfig, FRAGMENT_PATTERNS};
use url::Url;

use crate::source::parse_selector;
use crate::{DocumentSource, HarvestEvent, HarvestSink, Page, SourceError};

/// Enumerates entry URLs from the index page, one pass per fragment pattern.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    index_url: String,
    timeout: Duration,
    per_pattern_limit: Option<usize>,
}

impl LinkDiscoverer {
    pub fn new(index_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            index_url: index_url.into(),
            timeout,
            per_pattern_limit: None,
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.index_url.clone(), config.discovery_timeout)
            .with_per_pattern_limit(config.per_pattern_limit)
    }

    pub fn with_per_pattern_limit(mut self, limit: Option<usize>) -> Self {
        self.per_pattern_limit = limit;
        self
    }

    /// Distinct URLs in first-seen order. A pattern whose links never show
    /// up within the timeout contributes nothing.
    pub async fn discover(&self, source: &dyn DocumentSource, sink: &dyn HarvestSink) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut last_page: Option<Page> = None;

        for (pattern, _) in FRAGMENT_PATTERNS {
            let selector = anchor_selector(pattern);
            let page = match self.page_with(source, &selector, last_page.as_ref()).await {
                Ok(page) => page,
                Err(err) if err.is_timeout() => {
                    engine_warn!("Timeout while finding links for pattern {}", pattern);
                    sink.emit(HarvestEvent::DiscoveryTimeout { pattern });
                    continue;
                }
                Err(err) => {
                    engine_warn!("Could not load index for pattern {}: {}", pattern, err);
                    continue;
                }
            };

            let mut found = collect_hrefs(&page, &selector);
            if let Some(limit) = self.per_pattern_limit {
                found.truncate(limit);
            }
            engine_info!("Found {} links for pattern {}", found.len(), pattern);
            sink.emit(HarvestEvent::PatternDiscovered {
                pattern,
                count: found.len(),
            });

            links.extend(found.into_iter().filter(|link| seen.insert(link.clone())));
            last_page = Some(page);
        }

        engine_info!("Total unique links found: {}", links.len());
        sink.emit(HarvestEvent::DiscoveryFinished { total: links.len() });
        links
    }

    /// Reuse the previously loaded index when it already has matches.
    async fn page_with(
        &self,
        source: &dyn DocumentSource,
        selector: &str,
        last_page: Option<&Page>,
    ) -> Result<Page, SourceError> {
        let css = parse_selector(selector)?;
        if let Some(page) = last_page.filter(|page| page.matches(&css)) {
            return Ok(page.clone());
        }
        source.wait_for(&self.index_url, selector, self.timeout).await
    }
}

fn anchor_selector(pattern: &str) -> String {
    format!(r#"a[href*="{pattern}"]"#)
}

/// Absolute hrefs of anchors matching `selector`, resolved against the page
/// URL the way a browser reports them.
fn collect_hrefs(page: &Page, selector: &str) -> Vec<String> {
    let Ok(css) = parse_selector(selector) else {
        return Vec::new();
    };
    let base = Url::parse(&page.url).ok();
    let document = page.document();
    let hrefs: Vec<String> = document
        .select(&css)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(href, base.as_ref()))
        .collect();
    hrefs
}

fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Into::into)
}
