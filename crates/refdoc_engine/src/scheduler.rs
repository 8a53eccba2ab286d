use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_error, engine_info, engine_warn};
use futures_util::FutureExt;
use refdoc_core::{Claim, EntryRecord, HarvestConfig, HarvestState};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::persist::write_snapshot;
use crate::{
    ExtractError, FailureKind, HarvestError, HarvestEvent, HarvestSink, HarvestSummary,
    LinkDiscoverer, NoopSink, RecordBuilder, SnapshotKind, SourceError, SourceFactory,
};

/// Records and counters of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    /// In completion order.
    pub records: Vec<EntryRecord>,
    pub summary: HarvestSummary,
}

enum WorkerFailure {
    Page(ExtractError),
    /// No Document Source could be created; ends the run.
    Source(SourceError),
}

enum WorkerReport {
    Skipped {
        url: String,
        claim: Claim,
    },
    Finished {
        url: String,
        outcome: Result<EntryRecord, WorkerFailure>,
    },
}

struct WorkerContext {
    factory: Arc<dyn SourceFactory>,
    builder: RecordBuilder,
    state: Arc<Mutex<HarvestState>>,
}

/// Runs discovery once, then extracts every discovered page on a bounded
/// pool of workers, each with its own Document Source.
pub struct Harvester {
    config: HarvestConfig,
    factory: Arc<dyn SourceFactory>,
    sink: Arc<dyn HarvestSink>,
}

impl Harvester {
    pub fn new(config: HarvestConfig, factory: Arc<dyn SourceFactory>) -> Self {
        Self {
            config,
            factory,
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn HarvestSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Discover links from the index page and harvest them.
    pub async fn run(&self, cancel: CancellationToken) -> Result<HarvestOutcome, HarvestError> {
        let source = self.factory.create().map_err(|err| {
            engine_error!("Could not create document source for discovery: {}", err);
            HarvestError::SourceUnavailable(err)
        })?;
        let links = LinkDiscoverer::from_config(&self.config)
            .discover(source.as_ref(), self.sink.as_ref())
            .await;
        drop(source);

        engine_info!("Beginning to scrape {} links", links.len());
        self.harvest(links, cancel).await
    }

    /// Harvest the given links. Duplicates in `links` are dispatched but
    /// produce at most one record.
    pub async fn harvest(
        &self,
        links: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<HarvestOutcome, HarvestError> {
        let state = Arc::new(Mutex::new(HarvestState::new()));
        lock(&state).set_discovered(links.clone());

        let mut summary = HarvestSummary {
            discovered: lock(&state).discovered().len(),
            ..HarvestSummary::default()
        };

        let ctx = Arc::new(WorkerContext {
            factory: self.factory.clone(),
            builder: RecordBuilder::from_config(&self.config),
            state: state.clone(),
        });
        let workers = self.config.workers.max(1);
        let (tx, mut rx) = mpsc::channel::<WorkerReport>(workers * 2);
        let run_token = cancel.child_token();
        let dispatcher = tokio::spawn(dispatch(links, workers, ctx, tx, run_token.clone()));

        let progress_path = self.config.progress_path();
        let mut fatal: Option<SourceError> = None;

        while let Some(report) = rx.recv().await {
            match report {
                WorkerReport::Skipped { url, claim } => {
                    engine_info!("Skipping already processed URL: {}", url);
                    summary.skipped += 1;
                    self.sink.emit(HarvestEvent::PageSkipped { url, claim });
                }
                WorkerReport::Finished {
                    url,
                    outcome: Ok(record),
                } => {
                    let title = record.title.clone();
                    let snapshot = {
                        let mut guard = lock(&state);
                        guard
                            .record_success(&url, record)
                            .then(|| guard.results().to_vec())
                    };
                    let Some(snapshot) = snapshot else {
                        engine_info!("Dropping duplicate result for {}", url);
                        summary.skipped += 1;
                        self.sink.emit(HarvestEvent::PageSkipped {
                            url,
                            claim: Claim::AlreadyProcessed,
                        });
                        continue;
                    };

                    engine_info!("Successfully scraped {}", title);
                    self.sink.emit(HarvestEvent::PageCompleted {
                        url,
                        result: Ok(title),
                    });
                    self.save(SnapshotKind::Progress, progress_path.clone(), snapshot)
                        .await;
                }
                WorkerReport::Finished {
                    url,
                    outcome: Err(WorkerFailure::Page(err)),
                } => {
                    lock(&state).release(&url);
                    if err.is_discard() {
                        engine_warn!("Failed to extract content from {}: {}", url, err);
                    } else {
                        engine_error!("Error scraping {}: {}", url, err);
                    }
                    summary.failed += 1;
                    self.sink.emit(HarvestEvent::PageCompleted {
                        url,
                        result: Err(err),
                    });
                }
                WorkerReport::Finished {
                    url,
                    outcome: Err(WorkerFailure::Source(err)),
                } => {
                    lock(&state).release(&url);
                    engine_error!("Could not create document source for {}: {}", url, err);
                    summary.failed += 1;
                    self.sink.emit(HarvestEvent::PageCompleted {
                        url,
                        result: Err(ExtractError::new(FailureKind::Source, err.to_string())),
                    });
                    if fatal.is_none() {
                        run_token.cancel();
                        fatal = Some(err);
                    }
                }
            }
        }

        if let Err(err) = dispatcher.await {
            engine_error!("Dispatcher stopped unexpectedly: {}", err);
        }

        summary.cancelled = cancel.is_cancelled();
        let (records, processed) = {
            let guard = lock(&state);
            (guard.results().to_vec(), guard.processed_count())
        };
        summary.harvested = processed;
        self.save(SnapshotKind::Final, self.config.output_path.clone(), records.clone())
            .await;
        engine_info!(
            "Completed scraping. Successfully scraped {} of {} items",
            summary.harvested,
            summary.discovered
        );

        match fatal {
            Some(err) => Err(HarvestError::SourceUnavailable(err)),
            None => Ok(HarvestOutcome { records, summary }),
        }
    }

    /// Persistence failures are reported and never end the run. The write
    /// and fsync run on the blocking pool.
    async fn save(&self, kind: SnapshotKind, path: PathBuf, records: Vec<EntryRecord>) {
        let count = records.len();
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || write_snapshot(&target, &records))
            .await
            .map_err(|err| err.to_string())
            .and_then(|result| result.map_err(|err| err.to_string()));

        match written {
            Ok(written) => {
                engine_info!("Data saved to {:?}", written);
                self.sink.emit(HarvestEvent::SnapshotWritten {
                    kind,
                    path: written,
                    records: count,
                });
            }
            Err(message) => {
                engine_error!("Error saving JSON to {:?}: {}", path, message);
                self.sink.emit(HarvestEvent::SnapshotFailed {
                    kind,
                    path,
                    message,
                });
            }
        }
    }
}

/// Hand out one permit per page; stop handing out work once `cancel` fires.
async fn dispatch(
    links: Vec<String>,
    workers: usize,
    ctx: Arc<WorkerContext>,
    tx: mpsc::Sender<WorkerReport>,
    cancel: CancellationToken,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for url in links {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        if cancel.is_cancelled() {
            break;
        }

        let ctx = ctx.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            let report = run_worker(&ctx, url).await;
            drop(permit);
            let _ = tx.send(report).await;
        });
    }

    if cancel.is_cancelled() {
        engine_warn!("Dispatch stopped; waiting for {} in-flight pages", tasks.len());
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            engine_error!("Worker task failed: {}", err);
        }
    }
}

async fn run_worker(ctx: &WorkerContext, url: String) -> WorkerReport {
    let claim = lock(&ctx.state).claim(&url);
    if claim != Claim::Granted {
        return WorkerReport::Skipped { url, claim };
    }

    let outcome = AssertUnwindSafe(extract_page(ctx, &url))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(WorkerFailure::Page(ExtractError::new(
                FailureKind::Panicked,
                panic_message(panic.as_ref()),
            )))
        });
    WorkerReport::Finished { url, outcome }
}

async fn extract_page(ctx: &WorkerContext, url: &str) -> Result<EntryRecord, WorkerFailure> {
    let source = ctx.factory.create().map_err(WorkerFailure::Source)?;
    ctx.builder
        .build(source.as_ref(), url)
        .await
        .map_err(WorkerFailure::Page)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// A worker that panicked while holding the lock leaves the state usable.
fn lock(state: &Mutex<HarvestState>) -> MutexGuard<'_, HarvestState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
