use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::UnknownKindPolicy;

pub const DEFAULT_INDEX_URL: &str = "https://www.tradingview.com/pine-script-reference/v5/";
pub const DEFAULT_OUTPUT_PATH: &str = "pine_script_reference.json";
pub const DEFAULT_WORKERS: usize = 5;

/// Static parameters of one harvest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub index_url: String,
    pub workers: usize,
    /// Bounded wait for an entry page's content container.
    #[serde(with = "duration_ms")]
    pub page_timeout: Duration,
    /// Bounded wait per fragment pattern on the index page.
    #[serde(with = "duration_ms")]
    pub discovery_timeout: Duration,
    /// Delay between reloads while waiting for an element.
    #[serde(with = "duration_ms")]
    pub poll_interval: Duration,
    pub per_pattern_limit: Option<usize>,
    pub output_path: PathBuf,
    /// Defaults to `<output stem>_progress.<ext>` next to `output_path`.
    pub progress_path: Option<PathBuf>,
    pub unknown_kind: UnknownKindPolicy,
    pub layout: PageLayout,
    pub fetch: FetchSettings,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            workers: DEFAULT_WORKERS,
            page_timeout: Duration::from_secs(10),
            discovery_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            per_pattern_limit: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            progress_path: None,
            unknown_kind: UnknownKindPolicy::Discard,
            layout: PageLayout::default(),
            fetch: FetchSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("workers must be at least 1")]
    ZeroWorkers,
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("invalid index url {0}")]
    InvalidIndexUrl(String),
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.page_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("page_timeout"));
        }
        if self.discovery_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("discovery_timeout"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroTimeout("poll_interval"));
        }
        if Url::parse(&self.index_url).is_err() {
            return Err(ConfigError::InvalidIndexUrl(self.index_url.clone()));
        }
        Ok(())
    }

    pub fn progress_path(&self) -> PathBuf {
        self.progress_path
            .clone()
            .unwrap_or_else(|| progress_path_for(&self.output_path))
    }
}

/// `out/reference.json` -> `out/reference_progress.json`.
pub fn progress_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "harvest".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}_progress.{}", ext.to_string_lossy()),
        None => format!("{stem}_progress"),
    };
    output.with_file_name(name)
}

/// Class names describing the structure of an entry page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// Container of the entry selected by the URL fragment.
    pub container_class: String,
    pub header_class: String,
    pub sub_header_class: String,
    pub description_class: String,
    pub see_also_class: String,
    pub tag_label_class: String,
    /// Class fragment marking per-line token spans inside example code.
    pub code_token_class: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            container_class: "tv-pine-reference-item--selected".to_string(),
            header_class: "tv-pine-reference-item__header".to_string(),
            sub_header_class: "tv-pine-reference-item__sub-header".to_string(),
            description_class: "tv-pine-reference-item__text".to_string(),
            see_also_class: "tv-pine-reference-item__see-also".to_string(),
            tag_label_class: "tv-tag-label".to_string(),
            code_token_class: "mtk".to_string(),
        }
    }
}

impl PageLayout {
    pub fn container_selector(&self) -> String {
        format!(".{}", self.container_class)
    }
}

/// Transport limits for loading pages over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    #[serde(with = "duration_ms")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(HarvestConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_workers_and_bad_url() {
        let config = HarvestConfig {
            workers: 0,
            ..HarvestConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWorkers));

        let config = HarvestConfig {
            index_url: "not a url".to_string(),
            ..HarvestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidIndexUrl(_))));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = HarvestConfig {
            poll_interval: Duration::ZERO,
            ..HarvestConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("poll_interval"))
        );
    }

    #[test]
    fn progress_path_is_derived_from_output() {
        assert_eq!(
            progress_path_for(Path::new("out/reference.json")),
            PathBuf::from("out/reference_progress.json")
        );
        assert_eq!(
            progress_path_for(Path::new("reference")),
            PathBuf::from("reference_progress")
        );
    }

    #[test]
    fn explicit_progress_path_wins() {
        let config = HarvestConfig {
            progress_path: Some(PathBuf::from("p.json")),
            ..HarvestConfig::default()
        };
        assert_eq!(config.progress_path(), PathBuf::from("p.json"));
    }
}
