//! Exam configuration and source factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examrunner_core::traits::QuestionSource;

use crate::file::FileSource;
use crate::http::{HttpSource, DEFAULT_TIMEOUT_SECS};

/// Where the question bank is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File {
        path: PathBuf,
    },
    Http {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            path: PathBuf::from("public/questions.json"),
        }
    }
}

impl SourceConfig {
    /// Pick a source from a single location string: URLs become HTTP
    /// sources, anything else a file path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SourceConfig::Http {
                url: location.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }
        } else {
            SourceConfig::File {
                path: PathBuf::from(location),
            }
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level examrunner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Question bank source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Output directory for exported results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Number of questions the bank is expected to hold (validation only).
    #[serde(default)]
    pub expected_count: Option<usize>,
    /// Ask for confirmation before quitting an exam.
    #[serde(default = "default_true")]
    pub confirm_quit: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exam-results")
}

fn default_true() -> bool {
    true
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output_dir: default_output_dir(),
            expected_count: None,
            confirm_quit: true,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::File { path } => SourceConfig::File {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http { url, timeout_secs } => SourceConfig::Http {
            url: resolve_env_vars(url),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `examrunner.toml` in the current directory
/// 2. `~/.config/examrunner/config.toml`
///
/// Environment variable override: `EXAMRUNNER_QUESTIONS` (a path or URL).
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examrunner.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamConfig::default(),
    };

    // Apply env var override
    if let Ok(location) = std::env::var("EXAMRUNNER_QUESTIONS") {
        if !location.trim().is_empty() {
            config.source = SourceConfig::from_location(location.trim());
        }
    }

    config.source = resolve_source_config(&config.source);
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examrunner"))
}

/// Create a question source from its configuration.
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn QuestionSource>> {
    match config {
        SourceConfig::File { path } => Ok(Box::new(FileSource::new(path))),
        SourceConfig::Http { url, timeout_secs } => {
            anyhow::ensure!(*timeout_secs >= 1, "timeout_secs must be at least 1");
            Ok(Box::new(HttpSource::new(
                url,
                Duration::from_secs(*timeout_secs),
            )?))
        }
    }
}
