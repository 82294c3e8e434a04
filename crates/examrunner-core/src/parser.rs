//! JSON question bank loader.
//!
//! Loads question banks from JSON text or files and validates every entry.
//! A bank with any invalid entry is rejected as a whole.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::model::{Question, QuestionBank, OPTION_COUNT};

/// A shape error found in one entry of a question payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// One-based position of the entry in the payload.
    pub position: usize,
    /// The entry's `id` field, if it could be read.
    pub question_id: Option<u64>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question_id {
            Some(id) => write!(f, "question #{} (id {id}): {}", self.position, self.message),
            None => write!(f, "question #{}: {}", self.position, self.message),
        }
    }
}

/// Read and parse a question bank file.
pub fn load_question_file(path: &Path) -> Result<QuestionBank, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
        _ => LoadError::Unreachable(format!("{}: {e}", path.display())),
    })?;

    parse_question_bank_str(&content, &path.display().to_string())
}

/// Parse a JSON string into a `QuestionBank`.
///
/// `source` names where the payload came from and only appears in errors.
pub fn parse_question_bank_str(content: &str, source: &str) -> Result<QuestionBank, LoadError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| LoadError::Malformed(format!("{source}: {e}")))?;

    let Value::Array(entries) = value else {
        return Err(LoadError::Malformed(format!(
            "{source}: expected a JSON array of questions"
        )));
    };

    if entries.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut questions = Vec::with_capacity(entries.len());
    let mut issues = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, entry) in entries.iter().enumerate() {
        let position = i + 1;
        match check_entry(position, entry) {
            Ok(question) => {
                if let Some(message) = duplicate_id_issue(&mut seen_ids, question.id) {
                    issues.push(ValidationIssue {
                        position,
                        question_id: Some(question.id as u64),
                        message,
                    });
                }
                questions.push(question);
            }
            Err(mut entry_issues) => issues.append(&mut entry_issues),
        }
    }

    if !issues.is_empty() {
        tracing::warn!("{source}: rejected question bank with {} issue(s)", issues.len());
        return Err(LoadError::InvalidQuestions(issues));
    }

    tracing::debug!("{source}: loaded {} questions", questions.len());
    Ok(QuestionBank::from_validated(questions))
}

fn check_entry(position: usize, entry: &Value) -> Result<Question, Vec<ValidationIssue>> {
    let Value::Object(fields) = entry else {
        return Err(vec![ValidationIssue {
            position,
            question_id: None,
            message: "entry is not an object".into(),
        }]);
    };

    let raw_id = fields.get("id").and_then(Value::as_u64);
    let mut messages = Vec::new();

    let id = match fields.get("id") {
        None => {
            messages.push("missing 'id' field".to_string());
            None
        }
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => {
                messages.extend(id_issue(n));
                Some(n)
            }
            None => {
                messages.push(format!("'id' must be a positive integer (found {v})"));
                None
            }
        },
    };

    let text = match fields.get("question").and_then(Value::as_str) {
        Some(t) => {
            messages.extend(text_issue(t));
            Some(t.to_string())
        }
        None => {
            messages.push("missing or invalid 'question' field".into());
            None
        }
    };

    let options = check_options(fields, &mut messages);

    let answer_index = match fields.get("answerIndex") {
        None => {
            messages.push("missing 'answerIndex' field".into());
            None
        }
        Some(v) => match v.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => {
                messages.extend(answer_index_issue(n));
                Some(n)
            }
            None => {
                messages.push(format!(
                    "'answerIndex' must be 0, 1, 2, or 3 (found {v})"
                ));
                None
            }
        },
    };

    match (id, text, options, answer_index) {
        (Some(id), Some(text), Some(options), Some(answer_index)) if messages.is_empty() => {
            Ok(Question {
                id,
                text,
                options,
                answer_index,
            })
        }
        _ => Err(messages
            .into_iter()
            .map(|message| ValidationIssue {
                position,
                question_id: raw_id,
                message,
            })
            .collect()),
    }
}

fn check_options(
    fields: &Map<String, Value>,
    messages: &mut Vec<String>,
) -> Option<[String; OPTION_COUNT]> {
    let Some(Value::Array(raw)) = fields.get("options") else {
        messages.push("'options' must be an array".into());
        return None;
    };

    if raw.len() != OPTION_COUNT {
        messages.push(format!(
            "must have exactly {OPTION_COUNT} options, found {}",
            raw.len()
        ));
        return None;
    }

    let mut options: Vec<String> = Vec::with_capacity(OPTION_COUNT);
    let mut ok = true;
    for (i, opt) in raw.iter().enumerate() {
        match opt.as_str() {
            Some(s) => {
                messages.extend(option_issue(i + 1, s));
                options.push(s.to_string());
            }
            None => {
                messages.push(format!("option {} is not a string", i + 1));
                ok = false;
            }
        }
    }

    if !ok {
        return None;
    }
    options.try_into().ok()
}

// Per-question rules, shared by the JSON loader and `QuestionBank::new`.

fn id_issue(id: u32) -> Option<String> {
    (id == 0).then(|| "'id' must be a positive integer (found 0)".to_string())
}

fn text_issue(text: &str) -> Option<String> {
    text.trim()
        .is_empty()
        .then(|| "'question' is empty".to_string())
}

/// `number` is the one-based option number.
fn option_issue(number: usize, option: &str) -> Option<String> {
    option
        .trim()
        .is_empty()
        .then(|| format!("option {number} is empty"))
}

fn answer_index_issue(index: usize) -> Option<String> {
    (index >= OPTION_COUNT)
        .then(|| format!("'answerIndex' must be 0, 1, 2, or 3 (found {index})"))
}

pub(crate) fn duplicate_id_issue(seen: &mut HashSet<u32>, id: u32) -> Option<String> {
    let first = seen.insert(id);
    (!first).then(|| format!("duplicate id {id}"))
}

/// Every rule a typed question breaks, in field order.
pub(crate) fn question_issues(question: &Question) -> Vec<String> {
    let mut messages = Vec::new();
    messages.extend(id_issue(question.id));
    messages.extend(text_issue(&question.text));
    for (i, option) in question.options.iter().enumerate() {
        messages.extend(option_issue(i + 1, option));
    }
    messages.extend(answer_index_issue(question.answer_index));
    messages
}

/// A non-fatal observation about a valid question bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Check a loaded bank for issues that do not prevent an exam from running.
pub fn validate_question_bank(
    bank: &QuestionBank,
    expected_count: Option<usize>,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(expected) = expected_count {
        if bank.len() != expected {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("expected {expected} questions, found {}", bank.len()),
            });
        }
    }

    // Ids are expected to follow the file order
    for (i, q) in bank.iter().enumerate() {
        let expected_id = i + 1;
        if q.id as usize != expected_id {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("id is {}, expected {expected_id}", q.id),
            });
        }
    }

    for q in bank.iter() {
        let mut seen = HashSet::new();
        for opt in &q.options {
            if !seen.insert(opt.trim().to_lowercase()) {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!("duplicate option text: {}", opt.trim()),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"[
  {
    "id": 1,
    "question": "Which planet is closest to the sun?",
    "options": ["Venus", "Mercury", "Earth", "Mars"],
    "answerIndex": 1
  },
  {
    "id": 2,
    "question": "What is 3 x 3?",
    "options": ["6", "9", "12", "33"],
    "answerIndex": 1
  }
]"#;

    #[test]
    fn parse_valid_bank() {
        let bank = parse_question_bank_str(VALID_JSON, "test.json").unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(0).unwrap().options[1], "Mercury");
        assert_eq!(bank.find(2).unwrap().answer_index, 1);
    }

    #[test]
    fn reject_non_json() {
        let err = parse_question_bank_str("not json {", "bad.json").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn reject_non_array() {
        let err = parse_question_bank_str(r#"{"questions": []}"#, "obj.json").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(ref m) if m.contains("array")));
    }

    #[test]
    fn reject_empty_array() {
        let err = parse_question_bank_str("[]", "empty.json").unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn reject_three_options_without_truncating_or_padding() {
        let json = r#"[
  {"id": 1, "question": "Q1", "options": ["a", "b", "c", "d"], "answerIndex": 0},
  {"id": 2, "question": "Q2", "options": ["a", "b", "c"], "answerIndex": 0}
]"#;
        let err = parse_question_bank_str(json, "short.json").unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].position, 2);
        assert_eq!(issues[0].question_id, Some(2));
        assert!(issues[0].message.contains("exactly 4 options"));
    }

    #[test]
    fn reject_answer_index_out_of_range() {
        let json = r#"[{"id": 1, "question": "Q", "options": ["a", "b", "c", "d"], "answerIndex": 4}]"#;
        let err = parse_question_bank_str(json, "idx.json").unwrap_err();
        assert!(err.issues()[0].message.contains("answerIndex"));
    }

    #[test]
    fn reject_answer_index_beyond_usize_range() {
        let json = r#"[{"id": 1, "question": "Q", "options": ["a", "b", "c", "d"], "answerIndex": 4294967297}]"#;
        let err = parse_question_bank_str(json, "huge.json").unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("4294967297"), "{}", issues[0].message);
    }

    #[test]
    fn typed_and_json_checks_agree() {
        let json = r#"[
            {"id": 0, "question": " ", "options": ["a", "", "c", "d"], "answerIndex": 9},
            {"id": 2, "question": "", "options": ["a", "b", "c", "d"], "answerIndex": 0}
        ]"#;
        let from_json = parse_question_bank_str(json, "bad.json").unwrap_err();

        let typed = vec![
            Question {
                id: 0,
                text: " ".into(),
                options: ["a".into(), "".into(), "c".into(), "d".into()],
                answer_index: 9,
            },
            Question {
                id: 2,
                text: "".into(),
                options: ["a".into(), "b".into(), "c".into(), "d".into()],
                answer_index: 0,
            },
        ];
        let from_typed = QuestionBank::new(typed).unwrap_err();

        let messages = |err: &LoadError, position: usize| -> Vec<String> {
            err.issues()
                .iter()
                .filter(|i| i.position == position)
                .map(|i| i.message.clone())
                .collect()
        };

        assert_eq!(messages(&from_json, 1), messages(&from_typed, 1));
        assert_eq!(messages(&from_json, 1).len(), 4);
        assert_eq!(messages(&from_json, 2), messages(&from_typed, 2));
        assert_eq!(messages(&from_json, 2), vec!["'question' is empty"]);
    }

    #[test]
    fn reports_every_issue_of_an_entry() {
        let json = r#"[{"id": 0, "question": "  ", "options": ["a", "", "c", 4], "answerIndex": -1}]"#;
        let err = parse_question_bank_str(json, "many.json").unwrap_err();
        let messages: Vec<_> = err.issues().iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages.len(), 5, "got: {messages:?}");
        assert!(messages.iter().any(|m| m.contains("positive integer")));
        assert!(messages.iter().any(|m| m.contains("'question' is empty")));
        assert!(messages.iter().any(|m| m.contains("option 2 is empty")));
        assert!(messages.iter().any(|m| m.contains("option 4 is not a string")));
    }

    #[test]
    fn reject_duplicate_ids() {
        let json = r#"[
  {"id": 1, "question": "Q1", "options": ["a", "b", "c", "d"], "answerIndex": 0},
  {"id": 1, "question": "Q2", "options": ["a", "b", "c", "d"], "answerIndex": 0}
]"#;
        let err = parse_question_bank_str(json, "dupe.json").unwrap_err();
        assert!(err.issues()[0].message.contains("duplicate id"));
        assert!(err.to_string().contains("1 invalid question(s)"));
    }

    #[test]
    fn reject_non_object_entry() {
        let err = parse_question_bank_str(r#"["just a string"]"#, "str.json").unwrap_err();
        assert_eq!(err.issues()[0].message, "entry is not an object");
    }

    #[test]
    fn warnings_for_valid_bank() {
        let json = r#"[
  {"id": 1, "question": "Q1", "options": ["Yes", "No", "yes", "Maybe"], "answerIndex": 0},
  {"id": 5, "question": "Q2", "options": ["a", "b", "c", "d"], "answerIndex": 0}
]"#;
        let bank = parse_question_bank_str(json, "warn.json").unwrap();
        let warnings = validate_question_bank(&bank, Some(200));
        assert!(warnings.iter().any(|w| w.message.contains("expected 200")));
        assert!(warnings.iter().any(|w| w.message.contains("id is 5, expected 2")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate option")));
    }

    #[test]
    fn no_warnings_for_clean_bank() {
        let bank = parse_question_bank_str(VALID_JSON, "test.json").unwrap();
        assert!(validate_question_bank(&bank, Some(2)).is_empty());
        assert!(validate_question_bank(&bank, None).is_empty());
    }

    #[test]
    fn load_missing_file() {
        let err = load_question_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, VALID_JSON).unwrap();

        let bank = load_question_file(&path).unwrap();
        assert_eq!(bank.len(), 2);
    }
}
