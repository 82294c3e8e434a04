//! In-memory question source for tests and embedding.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use examrunner_core::error::LoadError;
use examrunner_core::traits::QuestionSource;

/// A question source that serves a fixed payload (or a fixed failure).
///
/// Lets front ends and tests drive a full session without touching the
/// filesystem or the network.
pub struct StaticSource {
    payload: Result<String, String>,
    /// Number of fetches made.
    fetch_count: AtomicU32,
}

impl StaticSource {
    /// Serve the given JSON payload.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Ok(payload.into()),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Fail every fetch as unreachable with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            payload: Err(message.into()),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Get the number of fetches made from this source.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn describe(&self) -> String {
        "static".into()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.payload
            .clone()
            .map_err(LoadError::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examrunner_core::traits::load_from_source;

    #[tokio::test]
    async fn fixed_payload() {
        let source = StaticSource::new(
            r#"[{"id": 1, "question": "Q", "options": ["a", "b", "c", "d"], "answerIndex": 0}]"#,
        );

        let bank = load_from_source(&source).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failing_source() {
        let source = StaticSource::failing("offline");
        let err = load_from_source(&source).await.unwrap_err();
        assert!(matches!(err, LoadError::Unreachable(ref m) if m == "offline"));
        assert_eq!(source.fetch_count(), 1);
    }
}
