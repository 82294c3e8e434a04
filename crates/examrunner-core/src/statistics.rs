//! Score aggregation over the answer log.
//!
//! Only submitted answers count: skipped and never-reached questions are
//! absent from the log and therefore excluded from the denominator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::SubmittedAnswer;

/// Aggregate counts derived from an answer log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    /// Number of submitted answers.
    pub total_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    /// Percentage of submitted answers that were correct, in `[0, 100]`.
    pub percentage: f64,
}

/// Compute the score summary for an answer log.
pub fn summarize(answers: &[SubmittedAnswer]) -> ScoreSummary {
    let total_questions = answers.len();
    let correct_answers = answers.iter().filter(|a| a.is_correct).count();

    ScoreSummary {
        total_questions,
        correct_answers,
        wrong_answers: total_questions - correct_answers,
        percentage: percentage(correct_answers, total_questions),
    }
}

/// `100 * correct / total`, defined as 0 when nothing was answered.
pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Qualitative rating of a score, as shown on the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Great,
    Good,
    KeepPracticing,
    NeedsPractice,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            PerformanceBand::Excellent
        } else if percentage >= 75.0 {
            PerformanceBand::Great
        } else if percentage >= 60.0 {
            PerformanceBand::Good
        } else if percentage >= 40.0 {
            PerformanceBand::KeepPracticing
        } else {
            PerformanceBand::NeedsPractice
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Excellent => write!(f, "Excellent!"),
            PerformanceBand::Great => write!(f, "Great Job!"),
            PerformanceBand::Good => write!(f, "Good Effort!"),
            PerformanceBand::KeepPracticing => write!(f, "Keep Practicing!"),
            PerformanceBand::NeedsPractice => write!(f, "Need More Practice"),
        }
    }
}
