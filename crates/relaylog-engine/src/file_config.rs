//! TOML pipeline configuration files.
//!
//! ```toml
//! [[targets]]
//! name = "console"
//! kind = "console"
//! stream = "stderr"
//!
//! [[targets]]
//! name = "file"
//! kind = "file"
//! path = "logs/app.log"
//! async = true
//!
//! [[rules]]
//! logger = "*"
//! min_level = "info"
//! write_to = ["console", "file"]
//! ```
//!
//! Relative file paths resolve against the directory of the configuration
//! file. Level names parse like everywhere else: unknown names mean `off`.

use crate::async_wrapper::DEFAULT_QUEUE_LIMIT;
use crate::config::PipelineConfig;
use crate::rule::RoutingRule;
use crate::severity::Severity;
use crate::sink::Sink;
use crate::sinks::{ConsoleSink, ConsoleStream, FileSink, MemorySink, ViewerTarget};
use relaylog_core::{LogError, Result};
use relaylog_core_types::schema::MATCH_ALL_PATTERN;
use relaylog_core_types::LogLevel;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default)]
    pub queue_limit: Option<usize>,
    #[serde(flatten)]
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetKind {
    Console {
        #[serde(default)]
        stream: ConsoleStream,
    },
    File {
        path: PathBuf,
    },
    Memory {
        #[serde(default)]
        capacity: Option<usize>,
    },
    Viewer {
        address: String,
        #[serde(default)]
        include_source_info: bool,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default = "match_all")]
    pub logger: String,
    pub min_level: String,
    pub write_to: Vec<String>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

fn match_all() -> String {
    MATCH_ALL_PATTERN.to_string()
}

impl FileConfig {
    /// # Errors
    ///
    /// Returns `LogError::InvalidConfig` with the parser's message.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| LogError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `LogError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source =
            fs::read_to_string(path.as_ref()).map_err(|e| LogError::io("read_pipeline_config", e))?;
        Self::from_toml_str(&source)
    }

    /// Build a live configuration, opening every sink.
    ///
    /// # Errors
    ///
    /// Fails on the first sink that cannot be opened, duplicate target
    /// names, or rules naming unknown targets.
    pub fn build(&self, base_dir: Option<&Path>) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::new();
        for target in &self.targets {
            let sink = target.kind.open(base_dir)?;
            if target.is_async {
                let limit = target.queue_limit.unwrap_or(DEFAULT_QUEUE_LIMIT);
                config.add_async_target(&target.name, sink, limit)?;
            } else {
                config.add_target(&target.name, sink)?;
            }
        }
        for rule in &self.rules {
            let min_level = Severity::from(LogLevel::parse_or_off(&rule.min_level).threshold());
            config.add_rule(
                RoutingRule::new(rule.logger.as_str(), min_level, rule.write_to.iter().cloned())
                    .with_final(rule.is_final),
            )?;
        }
        Ok(config)
    }
}

impl TargetKind {
    fn open(&self, base_dir: Option<&Path>) -> Result<Arc<dyn Sink>> {
        Ok(match self {
            TargetKind::Console { stream } => Arc::new(ConsoleSink::new(*stream)),
            TargetKind::File { path } => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                Arc::new(FileSink::open(path)?)
            }
            TargetKind::Memory { capacity } => Arc::new(MemorySink::new(
                capacity.unwrap_or(MemorySink::DEFAULT_CAPACITY),
            )),
            TargetKind::Viewer {
                address,
                include_source_info,
            } => Arc::new(
                ViewerTarget::new(address.as_str())
                    .with_source_info(*include_source_info)
                    .build()?,
            ),
        })
    }
}

/// Read and build the configuration file at `path`.
///
/// # Errors
///
/// As [`FileConfig::from_path`] and [`FileConfig::build`].
pub fn load(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    FileConfig::from_path(path)?.build(path.parent())
}
