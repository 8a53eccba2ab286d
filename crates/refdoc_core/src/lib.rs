//! Reference-doc harvester core: pure domain types and run bookkeeping.
mod config;
mod kind;
mod record;
mod state;

pub use config::{
    progress_path_for, ConfigError, FetchSettings, HarvestConfig, PageLayout, DEFAULT_INDEX_URL,
    DEFAULT_OUTPUT_PATH, DEFAULT_WORKERS,
};
pub use kind::{
    classify_fragment, classify_url, decoded_fragment, EntryKind, UnknownKindPolicy,
    FRAGMENT_PATTERNS,
};
pub use record::{compose_title, split_remarks, EntryFields, EntryRecord, NO_EXAMPLE};
pub use state::{Claim, HarvestState};
