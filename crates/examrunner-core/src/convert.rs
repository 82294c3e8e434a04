//! Plain-text question bank converter.
//!
//! Turns the text dump of a question paper into validated questions. The
//! input is expected to look like:
//!
//! ```text
//! 12. Which layer of the OSI model handles routing?
//! A) Data link
//! B) Network
//! C) Transport
//! D) Session
//! Answer: B
//! ```
//!
//! Each numbered block is either accepted or rejected with a reason.
//! Blocks are never padded, truncated, or given a default answer.

use std::fmt;

use serde::Serialize;

use crate::model::{option_letter, Question, OPTION_COUNT};

/// Outcome of converting a text dump.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    /// Questions that passed, renumbered from 1 in input order.
    pub accepted: Vec<Question>,
    /// Blocks that could not be turned into a question.
    pub rejected: Vec<RejectedBlock>,
}

impl ConversionReport {
    /// Total number of numbered blocks seen.
    pub fn blocks_seen(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// A numbered block that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedBlock {
    /// The number printed in front of the question.
    pub source_number: u32,
    /// One-based line where the block starts.
    pub line: usize,
    pub reason: RejectReason,
    /// The start of the question text, for display.
    pub excerpt: String,
}

/// Why a block was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    MissingQuestionText,
    WrongOptionCount(usize),
    OptionsOutOfOrder(String),
    EmptyOption(char),
    MissingAnswer,
    UnreadableAnswer(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingQuestionText => write!(f, "question text is empty"),
            RejectReason::WrongOptionCount(n) => {
                write!(f, "expected {OPTION_COUNT} options, found {n}")
            }
            RejectReason::OptionsOutOfOrder(labels) => {
                write!(f, "options are not labelled A to D in order (found {labels})")
            }
            RejectReason::EmptyOption(letter) => write!(f, "option {letter} is empty"),
            RejectReason::MissingAnswer => write!(f, "no answer key found"),
            RejectReason::UnreadableAnswer(raw) => write!(f, "cannot read answer key: {raw}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Question,
    Option,
    Answer,
}

#[derive(Debug)]
struct Block {
    number: u32,
    line: usize,
    text: String,
    options: Vec<(usize, String)>,
    answer: Option<Result<usize, String>>,
    last: Part,
}

impl Block {
    fn new(number: u32, line: usize, text: &str) -> Self {
        Self {
            number,
            line,
            text: text.to_string(),
            options: Vec::new(),
            answer: None,
            last: Part::Question,
        }
    }

    fn continue_with(&mut self, line: &str) {
        let target = match self.last {
            Part::Question => &mut self.text,
            Part::Option => match self.options.last_mut() {
                Some((_, text)) => text,
                None => &mut self.text,
            },
            // Trailing explanations after the answer key are dropped
            Part::Answer => return,
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(line);
    }

    fn finish(self) -> Result<(String, [String; OPTION_COUNT], usize), RejectReason> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(RejectReason::MissingQuestionText);
        }

        if self.options.len() != OPTION_COUNT {
            return Err(RejectReason::WrongOptionCount(self.options.len()));
        }

        let in_order = self
            .options
            .iter()
            .enumerate()
            .all(|(i, (label, _))| *label == i);
        if !in_order {
            let labels: String = self.options.iter().map(|(l, _)| option_letter(*l)).collect();
            return Err(RejectReason::OptionsOutOfOrder(labels));
        }

        if let Some((label, _)) = self.options.iter().find(|(_, t)| t.trim().is_empty()) {
            return Err(RejectReason::EmptyOption(option_letter(*label)));
        }

        let answer_index = match self.answer {
            None => return Err(RejectReason::MissingAnswer),
            Some(Err(raw)) => return Err(RejectReason::UnreadableAnswer(raw)),
            Some(Ok(index)) => index,
        };

        let options: Vec<String> = self
            .options
            .into_iter()
            .map(|(_, t)| t.trim().to_string())
            .collect();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|v: Vec<String>| RejectReason::WrongOptionCount(v.len()))?;

        Ok((text, options, answer_index))
    }
}

/// Convert a text dump into questions.
pub fn convert_text(input: &str) -> ConversionReport {
    let mut report = ConversionReport::default();
    let mut current: Option<Block> = None;

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((number, rest)) = parse_question_start(line) {
            if let Some(block) = current.take() {
                finish_block(block, &mut report);
            }
            current = Some(Block::new(number, i + 1, rest));
            continue;
        }

        let Some(block) = current.as_mut() else {
            // Preamble before the first question
            continue;
        };

        if let Some((label, text)) = parse_option(line) {
            block.options.push((label, text.to_string()));
            block.last = Part::Option;
        } else if let Some(answer) = parse_answer(line) {
            block.answer = Some(answer);
            block.last = Part::Answer;
        } else {
            block.continue_with(line);
        }
    }

    if let Some(block) = current.take() {
        finish_block(block, &mut report);
    }

    tracing::debug!(
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "conversion finished"
    );
    report
}

fn finish_block(block: Block, report: &mut ConversionReport) {
    let number = block.number;
    let line = block.line;
    let excerpt: String = block.text.trim().chars().take(60).collect();

    match block.finish() {
        Ok((text, options, answer_index)) => report.accepted.push(Question {
            id: report.accepted.len() as u32 + 1,
            text,
            options,
            answer_index,
        }),
        Err(reason) => {
            tracing::debug!(number, line, %reason, "rejected block");
            report.rejected.push(RejectedBlock {
                source_number: number,
                line,
                reason,
                excerpt,
            });
        }
    }
}

/// `"12. text"` or `"12) text"` -> `(12, "text")`.
fn parse_question_start(line: &str) -> Option<(u32, &str)> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let number: u32 = line[..digits_end].parse().ok()?;
    let rest = &line[digits_end..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        // "3.14 is pi" is text, not a question number
        return None;
    }
    Some((number, rest.trim()))
}

/// `"B) text"`, `"b. text"` or `"(b) text"` -> `(1, "text")`.
fn parse_option(line: &str) -> Option<(usize, &str)> {
    let line = line.strip_prefix('(').unwrap_or(line);
    let mut chars = line.char_indices();
    let (_, letter) = chars.next()?;
    let (sep_at, sep) = chars.next()?;
    if !matches!(letter.to_ascii_uppercase(), 'A'..='D') || !matches!(sep, ')' | '.') {
        return None;
    }
    let rest = &line[sep_at + 1..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let label = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
    Some((label, rest.trim()))
}

/// Recognise answer lines such as `"Answer: B"`, `"Ans. (c)"` or
/// `"Correct answer is d"`.
///
/// Returns `None` when the line is not an answer line, and `Some(Err)` when
/// it is one but the letter cannot be read.
fn parse_answer(line: &str) -> Option<Result<usize, String>> {
    let lower = line.to_lowercase();
    let body = lower
        .strip_prefix("correct")
        .map(str::trim_start)
        .unwrap_or(lower.as_str());

    let rest = ["answer", "ans"]
        .iter()
        .find_map(|prefix| body.strip_prefix(prefix))?;
    if rest.starts_with(|c: char| c.is_alphanumeric()) {
        // "answering ..." is ordinary text
        return None;
    }

    let rest = rest.trim_start_matches(|c: char| matches!(c, ':' | '.' | '-' | '=') || c.is_whitespace());
    let rest = rest.strip_prefix("is ").unwrap_or(rest).trim_start();
    let rest = rest.strip_prefix('(').unwrap_or(rest);

    let mut chars = rest.chars();
    let parsed = match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='d'), next) if next.map_or(true, |n| !n.is_alphanumeric()) => {
            Ok((c as u8 - b'a') as usize)
        }
        _ => Err(line.trim().to_string()),
    };
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Unit 3 question bank
Prepared for revision

1. Which planet is closest to the sun?
A) Venus
B) Mercury
C) Earth
D) Mars
Answer: B

2. What is the chemical symbol for
sodium?
a. So
b. Sd
c. Na
d. S
Ans. c

3) Which of these is a prime number?
(a) 21
(b) 27
(c) 29
(d) 33
Correct answer is (c)
Explanation: 29 has no divisors other than 1 and itself.
";

    #[test]
    fn converts_well_formed_blocks() {
        let report = convert_text(SAMPLE);
        assert!(report.rejected.is_empty(), "{:?}", report.rejected);
        assert_eq!(report.accepted.len(), 3);

        let q1 = &report.accepted[0];
        assert_eq!(q1.id, 1);
        assert_eq!(q1.text, "Which planet is closest to the sun?");
        assert_eq!(q1.options[1], "Mercury");
        assert_eq!(q1.answer_index, 1);

        let q2 = &report.accepted[1];
        assert_eq!(q2.text, "What is the chemical symbol for sodium?");
        assert_eq!(q2.answer_index, 2);

        assert_eq!(report.accepted[2].answer_index, 2);
        assert_eq!(report.accepted[2].options[3], "33");
    }

    #[test]
    fn option_continuation_lines_are_joined() {
        let text = "\
1. Pick the longest option
A) short
B) a much longer option that wraps
onto the next line
C) tiny
D) small
Answer: B
";
        let report = convert_text(text);
        assert_eq!(
            report.accepted[0].options[1],
            "a much longer option that wraps onto the next line"
        );
    }

    #[test]
    fn rejects_missing_answer_instead_of_defaulting() {
        let text = "1. Q\nA) a\nB) b\nC) c\nD) d\n";
        let report = convert_text(text);
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected[0].reason, RejectReason::MissingAnswer);
        assert_eq!(report.rejected[0].source_number, 1);
    }

    #[test]
    fn rejects_wrong_option_count() {
        let text = "7. Q\nA) a\nB) b\nC) c\nAnswer: A\n8. Next\nA) a\nB) b\nC) c\nD) d\nAnswer: D\n";
        let report = convert_text(text);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].reason, RejectReason::WrongOptionCount(3));
        assert_eq!(report.rejected[0].line, 1);
        // Accepted questions are renumbered
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].id, 1);
        assert_eq!(report.accepted[0].answer_index, 3);
        assert_eq!(report.blocks_seen(), 2);
    }

    #[test]
    fn rejects_unreadable_answer() {
        let text = "1. Q\nA) a\nB) b\nC) c\nD) d\nAnswer: E\n";
        let report = convert_text(text);
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::UnreadableAnswer(ref raw) if raw == "Answer: E"
        ));
    }

    #[test]
    fn rejects_out_of_order_options() {
        let text = "1. Q\nA) a\nC) c\nB) b\nD) d\nAnswer: A\n";
        let report = convert_text(text);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::OptionsOutOfOrder("ACBD".into())
        );
    }

    #[test]
    fn rejects_empty_question_text() {
        let text = "1.\nA) a\nB) b\nC) c\nD) d\nAnswer: A\n";
        let report = convert_text(text);
        assert_eq!(report.rejected[0].reason, RejectReason::MissingQuestionText);
    }

    #[test]
    fn accepted_questions_pass_the_loader() {
        let report = convert_text(SAMPLE);
        let json = serde_json::to_string(&report.accepted).unwrap();
        let bank = crate::parser::parse_question_bank_str(&json, "converted").unwrap();
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn empty_input() {
        let report = convert_text("");
        assert_eq!(report.blocks_seen(), 0);
    }

    #[test]
    fn question_start_parsing() {
        assert_eq!(parse_question_start("12. Text"), Some((12, "Text")));
        assert_eq!(parse_question_start("3) Text"), Some((3, "Text")));
        assert_eq!(parse_question_start("3.14 is pi"), None);
        assert_eq!(parse_question_start("Text 1."), None);
    }

    #[test]
    fn option_parsing() {
        assert_eq!(parse_option("A) Venus"), Some((0, "Venus")));
        assert_eq!(parse_option("d. Mars"), Some((3, "Mars")));
        assert_eq!(parse_option("(b) Earth"), Some((1, "Earth")));
        assert_eq!(parse_option("E) Pluto"), None);
        assert_eq!(parse_option("Ans: B"), None);
        assert_eq!(parse_option("A.I. is everywhere"), None);
    }

    #[test]
    fn answer_parsing() {
        assert_eq!(parse_answer("Answer: B"), Some(Ok(1)));
        assert_eq!(parse_answer("ANS - d"), Some(Ok(3)));
        assert_eq!(parse_answer("Answer is a"), Some(Ok(0)));
        assert_eq!(parse_answer("Ans. (c)"), Some(Ok(2)));
        assert_eq!(parse_answer("Answering machines"), None);
        assert_eq!(parse_answer("Another line"), None);
        assert!(matches!(parse_answer("Answer: Both"), Some(Err(_))));
    }
}
