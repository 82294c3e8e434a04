//! Error types for loading question banks and driving exam sessions.
//!
//! Load failures are surfaced once at startup. Session errors are rejected
//! synchronously and never mutate the session.

use thiserror::Error;

use crate::model::StageKind;
use crate::parser::ValidationIssue;

/// Errors that can occur while loading a question bank.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The question source does not exist.
    #[error("question source not found: {0}")]
    NotFound(String),

    /// The question source could not be reached or returned a failure status.
    #[error("question source unreachable: {0}")]
    Unreachable(String),

    /// The payload is not valid JSON or not a JSON array.
    #[error("malformed question payload: {0}")]
    Malformed(String),

    /// The payload is an empty array.
    #[error("question bank is empty")]
    Empty,

    /// One or more entries failed shape validation.
    #[error("{} invalid question(s); first: {}", .0.len(), first_issue(.0))]
    InvalidQuestions(Vec<ValidationIssue>),
}

fn first_issue(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl LoadError {
    /// The validation issues behind an `InvalidQuestions` failure.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            LoadError::InvalidQuestions(issues) => issues,
            _ => &[],
        }
    }
}

/// Errors returned by exam session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation is not permitted in the current stage.
    #[error("cannot {operation} while in {stage} stage")]
    InvalidTransition {
        operation: &'static str,
        stage: StageKind,
    },

    /// The submitted option index is not one of the question's options.
    #[error("option {selected} is out of range (question has {option_count} options)")]
    SelectionOutOfRange { selected: usize, option_count: usize },

    /// The navigation target is not a valid question index.
    #[error("question index {index} is out of range (exam has {question_count} questions)")]
    QuestionOutOfRange { index: usize, question_count: usize },

    /// Results were requested before the exam finished.
    #[error("results are only available in the result stage (currently {0})")]
    ResultsUnavailable(StageKind),
}

impl SessionError {
    /// Returns `true` if the caller passed a bad argument rather than calling
    /// the operation at the wrong time.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SessionError::SelectionOutOfRange { .. } | SessionError::QuestionOutOfRange { .. }
        )
    }
}
