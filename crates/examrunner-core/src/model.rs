//! Core data model types for examrunner.
//!
//! These are the fundamental types that the whole system uses to represent
//! questions, per-question status, submitted answers, and session stages.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;
use crate::parser::{duplicate_id_issue, question_issues, ValidationIssue};

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique, positive identifier.
    pub id: u32,
    /// The question text.
    #[serde(rename = "question")]
    pub text: String,
    /// Exactly four answer options.
    pub options: [String; OPTION_COUNT],
    /// Zero-based index of the correct option.
    pub answer_index: usize,
}

impl Question {
    /// Returns `true` if `selected_index` is the correct option.
    pub fn is_correct(&self, selected_index: usize) -> bool {
        selected_index == self.answer_index
    }

    /// The text of the correct option.
    pub fn correct_option(&self) -> &str {
        &self.options[self.answer_index]
    }
}

/// An immutable, ordered collection of validated questions.
///
/// Built by the loader in [`crate::parser`]; it is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already-typed questions, applying the same rules as
    /// the JSON loader.
    pub fn new(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut issues = Vec::new();
        let mut seen_ids = HashSet::new();
        for (i, q) in questions.iter().enumerate() {
            let messages = question_issues(q)
                .into_iter()
                .chain(duplicate_id_issue(&mut seen_ids, q.id));
            issues.extend(messages.map(|message| ValidationIssue {
                position: i + 1,
                question_id: Some(u64::from(q.id)),
                message,
            }));
        }

        if !issues.is_empty() {
            return Err(LoadError::InvalidQuestions(issues));
        }
        Ok(Self { questions })
    }

    pub(crate) fn from_validated(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by its id.
    pub fn find(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Lifecycle of a single question within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum QuestionStatus {
    #[default]
    Unanswered,
    Answered {
        #[serde(rename = "selectedIndex")]
        selected_index: usize,
        #[serde(rename = "isCorrect")]
        is_correct: bool,
    },
    Skipped,
}

impl QuestionStatus {
    pub fn is_unanswered(&self) -> bool {
        matches!(self, QuestionStatus::Unanswered)
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, QuestionStatus::Answered { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, QuestionStatus::Skipped)
    }

    /// The recorded selection, if the question was answered.
    pub fn selected_index(&self) -> Option<usize> {
        match self {
            QuestionStatus::Answered { selected_index, .. } => Some(*selected_index),
            _ => None,
        }
    }

    /// Whether the recorded selection was correct, if answered.
    pub fn is_correct(&self) -> Option<bool> {
        match self {
            QuestionStatus::Answered { is_correct, .. } => Some(*is_correct),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionStatus::Unanswered => write!(f, "unanswered"),
            QuestionStatus::Answered { .. } => write!(f, "answered"),
            QuestionStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One entry of the append-only answer log.
///
/// `correct_index` is captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: u32,
    pub selected_index: usize,
    pub is_correct: bool,
    pub correct_index: usize,
}

/// The top-level phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum Stage {
    #[default]
    Intro,
    Exam {
        #[serde(rename = "currentQuestionIndex")]
        current_index: usize,
    },
    Result,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Intro => StageKind::Intro,
            Stage::Exam { .. } => StageKind::Exam,
            Stage::Result => StageKind::Result,
        }
    }

    /// The current question index while in the exam stage.
    pub fn current_index(&self) -> Option<usize> {
        match self {
            Stage::Exam { current_index } => Some(*current_index),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Exam { current_index } => write!(f, "exam({current_index})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A stage without its payload, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Intro,
    Exam,
    Result,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Intro => write!(f, "intro"),
            StageKind::Exam => write!(f, "exam"),
            StageKind::Result => write!(f, "result"),
        }
    }
}

impl FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intro" => Ok(StageKind::Intro),
            "exam" => Ok(StageKind::Exam),
            "result" | "results" => Ok(StageKind::Result),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

/// Convert an option index into its letter label (0 -> 'A').
pub fn option_letter(index: usize) -> char {
    (b'A' + (index as u8 % 26)) as char
}

/// Parse an option label (`"b"`, `"B"`, `"2"`) into a zero-based index.
///
/// Numeric labels are one-based. Returns `None` for anything else; range
/// checking against the question is left to the session.
pub fn parse_option_label(label: &str) -> Option<usize> {
    let label = label.trim();
    if let Ok(n) = label.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: 1,
            text: "2 + 2 = ?".into(),
            options: ["3".into(), "4".into(), "5".into(), "22".into()],
            answer_index: 1,
        }
    }

    #[test]
    fn question_json_uses_source_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["question"], "2 + 2 = ?");
        assert_eq!(json["answerIndex"], 1);
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn question_correctness() {
        let q = sample();
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.correct_option(), "4");
    }

    #[test]
    fn bank_new_applies_loader_rules() {
        let bank = QuestionBank::new(vec![sample()]).unwrap();
        assert_eq!(bank.len(), 1);

        assert!(matches!(QuestionBank::new(vec![]), Err(LoadError::Empty)));

        let mut bad = sample();
        bad.answer_index = 4;
        let err = QuestionBank::new(vec![sample(), bad]).unwrap_err();
        let messages: Vec<_> = err.issues().iter().map(|i| i.message.clone()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate id 1")));
        assert!(messages.iter().any(|m| m.contains("answerIndex")));
    }

    #[test]
    fn status_accessors() {
        let answered = QuestionStatus::Answered {
            selected_index: 2,
            is_correct: false,
        };
        assert_eq!(answered.selected_index(), Some(2));
        assert_eq!(answered.is_correct(), Some(false));
        assert_eq!(QuestionStatus::Skipped.selected_index(), None);
        assert!(QuestionStatus::default().is_unanswered());
        assert_eq!(answered.to_string(), "answered");
    }

    #[test]
    fn submitted_answer_json_keys() {
        let answer = SubmittedAnswer {
            question_id: 7,
            selected_index: 0,
            is_correct: true,
            correct_index: 0,
        };
        let json = serde_json::to_string(&answer).unwrap();
        assert_eq!(
            json,
            r#"{"questionId":7,"selectedIndex":0,"isCorrect":true,"correctIndex":0}"#
        );
    }

    #[test]
    fn stage_display_and_kind() {
        assert_eq!(Stage::Intro.to_string(), "intro");
        assert_eq!(Stage::Exam { current_index: 3 }.to_string(), "exam(3)");
        assert_eq!(Stage::Result.kind(), StageKind::Result);
        assert_eq!(Stage::Exam { current_index: 3 }.current_index(), Some(3));
        assert_eq!("Results".parse::<StageKind>().unwrap(), StageKind::Result);
        assert!("review".parse::<StageKind>().is_err());
    }

    #[test]
    fn option_labels() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(parse_option_label("b"), Some(1));
        assert_eq!(parse_option_label(" D "), Some(3));
        assert_eq!(parse_option_label("1"), Some(0));
        assert_eq!(parse_option_label("6"), Some(5));
        assert_eq!(parse_option_label("0"), None);
        assert_eq!(parse_option_label("ab"), None);
        assert_eq!(parse_option_label(""), None);
    }
}
