//! Harvest engine: document sources, page extraction and the worker pool.
mod builder;
mod decode;
mod discover;
mod dom;
mod example;
mod http_source;
mod persist;
mod scheduler;
mod sections;
mod source;
mod static_source;
mod types;

pub use builder::RecordBuilder;
pub use decode::{decode_page, DecodedPage};
pub use discover::LinkDiscoverer;
pub use example::{extract_example, ExampleStrategy, EXAMPLE_STRATEGIES};
pub use http_source::{HttpDocumentSource, HttpSourceFactory};
pub use persist::{ensure_output_dir, write_atomic, write_snapshot, PersistError};
pub use scheduler::{HarvestOutcome, Harvester};
pub use sections::{extract_remarks, extract_section};
pub use source::{parse_selector, DocumentSource, Page, SourceFactory};
pub use static_source::{StaticSource, StaticSourceFactory};
pub use types::{
    ExtractError, FailureKind, HarvestError, HarvestEvent, HarvestSink, HarvestSummary, NoopSink,
    SnapshotKind, SourceError,
};
