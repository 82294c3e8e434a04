//! Local file question source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use examrunner_core::error::LoadError;
use examrunner_core::traits::QuestionSource;

/// Reads the question payload from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LoadError::NotFound(self.describe()),
                _ => LoadError::Unreachable(format!("{}: {e}", self.describe())),
            })
    }
}
