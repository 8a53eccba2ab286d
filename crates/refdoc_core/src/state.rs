use std::collections::HashSet;

use crate::EntryRecord;

/// Result of trying to claim a URL for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The caller owns the URL until it reports success or releases it.
    Granted,
    AlreadyProcessed,
    InFlight,
}

/// Per-run harvest bookkeeping. Owned by the scheduler and shared with its
/// workers behind a lock; never global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestState {
    discovered_links: Vec<String>,
    processed_urls: HashSet<String>,
    in_flight: HashSet<String>,
    results: Vec<EntryRecord>,
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the discovered link set, dropping duplicates while keeping
    /// first-seen order.
    pub fn set_discovered(&mut self, links: Vec<String>) {
        let mut seen = HashSet::new();
        self.discovered_links = links
            .into_iter()
            .filter(|link| seen.insert(link.clone()))
            .collect();
    }

    pub fn discovered(&self) -> &[String] {
        &self.discovered_links
    }

    pub fn claim(&mut self, url: &str) -> Claim {
        if self.processed_urls.contains(url) {
            return Claim::AlreadyProcessed;
        }
        if !self.in_flight.insert(url.to_string()) {
            return Claim::InFlight;
        }
        Claim::Granted
    }

    /// Give a claimed URL back after a failed extraction.
    pub fn release(&mut self, url: &str) {
        self.in_flight.remove(url);
    }

    /// Record a successful extraction. Returns `false` and keeps the existing
    /// record if the URL was already processed in this run.
    pub fn record_success(&mut self, url: &str, record: EntryRecord) -> bool {
        self.in_flight.remove(url);
        if !self.processed_urls.insert(url.to_string()) {
            return false;
        }
        self.results.push(record);
        true
    }

    pub fn results(&self) -> &[EntryRecord] {
        &self.results
    }

    pub fn processed_count(&self) -> usize {
        self.processed_urls.len()
    }
}
