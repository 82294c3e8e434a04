//! examrunner-sources: Question sources and configuration.
//!
//! Implements the `QuestionSource` trait for local files, HTTP endpoints, and
//! in-memory payloads, and loads the `examrunner.toml` configuration that
//! selects between them.

pub mod config;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{create_source, load_config_from, ExamConfig, SourceConfig};
pub use file::FileSource;
pub use http::HttpSource;
pub use mock::StaticSource;
