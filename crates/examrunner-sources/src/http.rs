//! HTTP question source.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use examrunner_core::error::LoadError;
use examrunner_core::traits::QuestionSource;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches the question payload with a single GET request.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LoadError::Unreachable(format!("{}: request timed out", self.url))
                } else {
                    LoadError::Unreachable(format!("{}: {e}", self.url))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(self.url.clone()));
        }
        if !status.is_success() {
            return Err(LoadError::Unreachable(format!(
                "{}: HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::Unreachable(format!("{}: {e}", self.url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examrunner_core::traits::load_from_source;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer) -> HttpSource {
        HttpSource::new(
            &format!("{}/questions.json", server.uri()),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn successful_fetch() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            {"id": 1, "question": "Capital of France?", "options": ["Lyon", "Paris", "Nice", "Lille"], "answerIndex": 1}
        ]);

        Mock::given(method("GET"))
            .and(path("/questions.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let bank = load_from_source(&source_for(&server)).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get(0).unwrap().correct_option(), "Paris");
    }

    #[tokio::test]
    async fn missing_payload_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[tokio::test]
    async fn server_error_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch().await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn html_error_page_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = load_from_source(&source_for(&server)).await.unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions.json"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let source = HttpSource::new(
            &format!("{}/questions.json", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }
}
