use std::sync::atomic::{AtomicUsize, Ordering};

use refdoc_engine::{HarvestEvent, HarvestSink, SnapshotKind};

/// Prints a line per harvest milestone to stdout; details go to the log.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    discovered: AtomicUsize,
    done: AtomicUsize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, event: &HarvestEvent) -> Option<String> {
        match event {
            HarvestEvent::PatternDiscovered { pattern, count } => {
                Some(format!("Found {count} links for pattern {pattern}"))
            }
            HarvestEvent::DiscoveryTimeout { pattern } => {
                Some(format!("No links for pattern {pattern} before timeout"))
            }
            HarvestEvent::DiscoveryFinished { total } => {
                self.discovered.store(*total, Ordering::Relaxed);
                Some(format!("Total unique links found: {total}"))
            }
            HarvestEvent::PageCompleted { result, .. } => {
                let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
                let total = self.discovered.load(Ordering::Relaxed);
                Some(match result {
                    Ok(title) => format!("[{done}/{total}] {title}"),
                    Err(err) => format!("[{done}/{total}] skipped: {err}"),
                })
            }
            HarvestEvent::SnapshotWritten {
                kind: SnapshotKind::Final,
                path,
                records,
            } => Some(format!("Saved {records} records to {}", path.display())),
            HarvestEvent::SnapshotFailed { path, message, .. } => {
                Some(format!("Could not save {}: {message}", path.display()))
            }
            HarvestEvent::PageSkipped { .. } | HarvestEvent::SnapshotWritten { .. } => None,
        }
    }
}

impl HarvestSink for ConsoleSink {
    fn emit(&self, event: HarvestEvent) {
        if let Some(line) = self.line(&event) {
            println!("{line}");
        }
    }
}
