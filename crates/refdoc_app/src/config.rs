//! Loads [`HarvestConfig`] from an optional RON file and applies CLI flags.
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::engine_info;
use refdoc_core::HarvestConfig;

use crate::cli::Cli;

pub fn resolve(cli: &Cli) -> Result<HarvestConfig> {
    let mut config = match &cli.config {
        Some(path) => load(path)?,
        None => HarvestConfig::default(),
    };
    apply_overrides(&mut config, cli);
    config.validate().context("invalid harvest settings")?;
    Ok(config)
}

/// Missing fields take their defaults.
pub fn load(path: &Path) -> Result<HarvestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {path:?}"))?;
    let config: HarvestConfig =
        ron::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))?;
    engine_info!("Loaded harvest settings from {:?}", path);
    Ok(config)
}

fn apply_overrides(config: &mut HarvestConfig, cli: &Cli) {
    if let Some(url) = &cli.index_url {
        config.index_url = url.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(progress) = &cli.progress {
        config.progress_path = Some(progress.clone());
    }
    if let Some(ms) = cli.page_timeout_ms {
        config.page_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.discovery_timeout_ms {
        config.discovery_timeout = Duration::from_millis(ms);
    }
    if cli.limit.is_some() {
        config.per_pattern_limit = cli.limit;
    }
    if let Some(policy) = cli.unknown_kind {
        config.unknown_kind = policy.into();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use refdoc_core::{UnknownKindPolicy, DEFAULT_INDEX_URL};
    use tempfile::TempDir;

    use super::*;
    use crate::cli::UnknownKindArg;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("harvest.ron");
        fs::write(
            &path,
            r#"(workers: 2, page_timeout: 2500, unknown_kind: whole_url, layout: (code_token_class: "tok"))"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.page_timeout, Duration::from_millis(2500));
        assert_eq!(config.unknown_kind, UnknownKindPolicy::WholeUrl);
        assert_eq!(config.layout.code_token_class, "tok");
        assert_eq!(config.index_url, DEFAULT_INDEX_URL);
        assert_eq!(
            config.layout.container_class,
            "tv-pine-reference-item--selected"
        );
    }

    #[test]
    fn flags_override_file_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("harvest.ron");
        fs::write(&path, "(workers: 2, per_pattern_limit: Some(4))").unwrap();

        let cli = Cli {
            config: Some(path),
            workers: Some(8),
            output: Some(PathBuf::from("out/ref.json")),
            unknown_kind: Some(UnknownKindArg::Discard),
            ..Cli::default()
        };
        let config = resolve(&cli).unwrap();

        assert_eq!(config.workers, 8);
        assert_eq!(config.per_pattern_limit, Some(4));
        assert_eq!(config.output_path, PathBuf::from("out/ref.json"));
        assert_eq!(config.progress_path(), PathBuf::from("out/ref_progress.json"));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cli = Cli {
            workers: Some(0),
            ..Cli::default()
        };
        assert!(resolve(&cli).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(load(&temp.path().join("absent.ron")).is_err());
    }
}
