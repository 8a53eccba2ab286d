use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use refdoc_core::Claim;

/// Failures of the Document Source capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },
    #[error("request timed out: {0}")]
    RequestTimeout(String),
    #[error("redirect limit exceeded")]
    RedirectLimitExceeded,
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("document source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout { .. })
    }
}

/// Why a page produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ExtractionTimeout,
    MissingTitle,
    UnknownKind,
    Source,
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ExtractionTimeout => write!(f, "extraction timeout"),
            FailureKind::MissingTitle => write!(f, "missing title"),
            FailureKind::UnknownKind => write!(f, "unknown kind"),
            FailureKind::Source => write!(f, "document source error"),
            FailureKind::Panicked => write!(f, "extraction panicked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub kind: FailureKind,
    pub message: String,
}

impl ExtractError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Structural mismatches are expected on some pages and logged as warnings.
    pub fn is_discard(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::MissingTitle | FailureKind::UnknownKind | FailureKind::ExtractionTimeout
        )
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExtractError {}

/// Errors that end a harvest run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarvestError {
    #[error("could not create a document source: {0}")]
    SourceUnavailable(SourceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Progress,
    Final,
}

/// Progress notifications emitted by discovery and the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    PatternDiscovered {
        pattern: &'static str,
        count: usize,
    },
    DiscoveryTimeout {
        pattern: &'static str,
    },
    DiscoveryFinished {
        total: usize,
    },
    PageSkipped {
        url: String,
        claim: Claim,
    },
    /// `Ok` carries the record title.
    PageCompleted {
        url: String,
        result: Result<String, ExtractError>,
    },
    SnapshotWritten {
        kind: SnapshotKind,
        path: PathBuf,
        records: usize,
    },
    SnapshotFailed {
        kind: SnapshotKind,
        path: PathBuf,
        message: String,
    },
}

pub trait HarvestSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl HarvestSink for NoopSink {
    fn emit(&self, _event: HarvestEvent) {}
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub discovered: usize,
    pub harvested: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}
