use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::{LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use refdoc_core::UnknownKindPolicy;

/// Harvest a scripting-language reference site into a JSON file.
#[derive(Parser, Debug, Default)]
#[command(name = "refdoc-harvest", version)]
pub struct Cli {
    /// RON file with harvest settings; flags below override it.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Index page listing every reference entry.
    #[arg(long)]
    pub index_url: Option<String>,

    /// Number of pages extracted concurrently.
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Final output file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Progress snapshot file, rewritten after every harvested page.
    #[arg(long)]
    pub progress: Option<PathBuf>,

    /// Wait for an entry page's content, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub page_timeout_ms: Option<u64>,

    /// Wait for each link pattern on the index page, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub discovery_timeout_ms: Option<u64>,

    /// Keep at most this many links per pattern.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Handling of pages whose fragment matches no known kind.
    #[arg(long, value_enum)]
    pub unknown_kind: Option<UnknownKindArg>,

    #[arg(long, value_enum, default_value_t = LogTarget::Both)]
    pub log_to: LogTarget,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnknownKindArg {
    Discard,
    WholeUrl,
}

impl From<UnknownKindArg> for UnknownKindPolicy {
    fn from(arg: UnknownKindArg) -> Self {
        match arg {
            UnknownKindArg::Discard => UnknownKindPolicy::Discard,
            UnknownKindArg::WholeUrl => UnknownKindPolicy::WholeUrl,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Terminal,
    #[default]
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_into_overrides() {
        let cli = Cli::try_parse_from([
            "refdoc-harvest",
            "--workers",
            "3",
            "--output",
            "out/ref.json",
            "--unknown-kind",
            "whole-url",
            "--log-to",
            "file",
        ])
        .unwrap();

        assert_eq!(cli.workers, Some(3));
        assert_eq!(cli.output, Some(PathBuf::from("out/ref.json")));
        assert_eq!(cli.unknown_kind, Some(UnknownKindArg::WholeUrl));
        assert_eq!(cli.log_to, LogTarget::File);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }
}
