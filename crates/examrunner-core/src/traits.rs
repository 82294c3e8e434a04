//! Core trait definitions for question sources and session observers.
//!
//! `QuestionSource` is implemented by the `examrunner-sources` crate.
//! `SessionObserver` lets front ends react to session changes without
//! owning any session state.

use async_trait::async_trait;

use crate::error::{LoadError, SessionError};
use crate::model::{QuestionBank, Stage, SubmittedAnswer};
use crate::parser::parse_question_bank_str;

// ---------------------------------------------------------------------------
// Question source trait
// ---------------------------------------------------------------------------

/// Trait for places a question bank payload can be fetched from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable description of the source (a path or URL).
    fn describe(&self) -> String;

    /// Fetch the raw JSON payload.
    async fn fetch(&self) -> Result<String, LoadError>;
}

/// Fetch and validate a question bank from a source.
///
/// This is the only asynchronous step before a session can be created.
pub async fn load_from_source(source: &dyn QuestionSource) -> Result<QuestionBank, LoadError> {
    let description = source.describe();
    tracing::debug!("loading questions from {description}");
    let payload = source.fetch().await?;
    parse_question_bank_str(&payload, &description)
}

// ---------------------------------------------------------------------------
// Session observer trait
// ---------------------------------------------------------------------------

/// Receives notifications after each session operation completes.
pub trait SessionObserver: Send + Sync {
    fn on_stage_change(&self, from: Stage, to: Stage);
    fn on_answer(&self, answer: &SubmittedAnswer);
    fn on_skip(&self, question_id: u32);
    fn on_rejected(&self, operation: &str, error: &SessionError);
    fn on_restart(&self);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_stage_change(&self, _: Stage, _: Stage) {}
    fn on_answer(&self, _: &SubmittedAnswer) {}
    fn on_skip(&self, _: u32) {}
    fn on_rejected(&self, _: &str, _: &SessionError) {}
    fn on_restart(&self) {}
}

/// Session observer that emits `tracing` events.
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_stage_change(&self, from: Stage, to: Stage) {
        tracing::debug!(%from, %to, "stage changed");
    }

    fn on_answer(&self, answer: &SubmittedAnswer) {
        tracing::debug!(
            question_id = answer.question_id,
            selected = answer.selected_index,
            correct = answer.is_correct,
            "answer recorded"
        );
    }

    fn on_skip(&self, question_id: u32) {
        tracing::debug!(question_id, "question skipped");
    }

    fn on_rejected(&self, operation: &str, error: &SessionError) {
        tracing::warn!(operation, "rejected: {error}");
    }

    fn on_restart(&self) {
        tracing::info!("session restarted");
    }
}
