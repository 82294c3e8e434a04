//! Exam results with JSON persistence and Markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{option_letter, QuestionBank, SubmittedAnswer};
use crate::statistics::{summarize, PerformanceBand, ScoreSummary};

/// The final result of an exam, in the shape of the downloadable artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResults {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub percentage: f64,
    /// Submitted answers in chronological order.
    pub answers: Vec<SubmittedAnswer>,
    /// When the result stage was entered.
    pub completed_at: DateTime<Utc>,
}

impl ExamResults {
    /// Build results from an answer log and the completion snapshot.
    pub fn from_log(answers: &[SubmittedAnswer], completed_at: DateTime<Utc>) -> Self {
        let summary = summarize(answers);
        Self {
            total_questions: summary.total_questions,
            correct_answers: summary.correct_answers,
            wrong_answers: summary.wrong_answers,
            percentage: summary.percentage,
            answers: answers.to_vec(),
            completed_at,
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            percentage: self.percentage,
        }
    }

    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::from_percentage(self.percentage)
    }

    /// File name used when exporting, e.g. `exam-results-2025-01-31.json`.
    pub fn default_file_name(&self) -> String {
        format!("exam-results-{}.json", self.completed_at.format("%Y-%m-%d"))
    }

    /// Save the results as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let results: ExamResults =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(results)
    }

    /// Format the results as Markdown.
    ///
    /// When the question bank is available each answer row includes the
    /// question text.
    pub fn to_markdown(&self, bank: Option<&QuestionBank>) -> String {
        let mut md = String::new();

        md.push_str("## Exam Results\n\n");
        md.push_str(&format!(
            "**Score:** {:.1}% ({})\n\n",
            self.percentage,
            self.band()
        ));
        md.push_str(&format!(
            "**Summary:** {} answered, {} correct, {} wrong\n\n",
            self.total_questions, self.correct_answers, self.wrong_answers
        ));
        md.push_str(&format!(
            "_Completed at {}_\n\n",
            self.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if self.answers.is_empty() {
            md.push_str("No questions were answered.\n");
            return md;
        }

        md.push_str("### Answers\n\n");
        md.push_str("| Question | Text | Your answer | Correct answer | Result |\n");
        md.push_str("|----------|------|-------------|----------------|--------|\n");
        for a in &self.answers {
            let text = bank
                .and_then(|b| b.find(a.question_id))
                .map(|q| q.text.replace('|', "\\|"))
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                a.question_id,
                text,
                option_letter(a.selected_index),
                option_letter(a.correct_index),
                if a.is_correct { "correct" } else { "wrong" }
            ));
        }

        md
    }
}
