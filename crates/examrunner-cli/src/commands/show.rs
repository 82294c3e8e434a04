//! The `examrunner show` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use examrunner_core::model::{option_letter, QuestionBank};
use examrunner_core::parser::load_question_file;
use examrunner_core::report::ExamResults;
use examrunner_report::html::write_html_report;

pub fn execute(
    results_path: PathBuf,
    format: String,
    html: Option<PathBuf>,
    questions: Option<PathBuf>,
) -> Result<()> {
    let results = ExamResults::load_json(&results_path)?;
    let bank = questions
        .map(|p| {
            load_question_file(&p)
                .with_context(|| format!("failed to load questions from {}", p.display()))
        })
        .transpose()?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", results.to_markdown(bank.as_ref()));
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        "text" => {
            println!("{}", summary_table(&results));
            println!("{}", results.band());
            if !results.answers.is_empty() {
                println!("\n{}", answers_table(&results, bank.as_ref()));
            }
        }
        other => anyhow::bail!("unknown format: '{other}' (expected text, markdown or json)"),
    }

    if let Some(path) = html {
        write_html_report(&results, bank.as_ref(), &path)?;
        eprintln!("HTML report: {}", path.display());
    }

    Ok(())
}

/// One-row table with the score counters.
pub(crate) fn summary_table(results: &ExamResults) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Answered", "Correct", "Wrong", "Score", "Completed"]);
    table.add_row(vec![
        Cell::new(results.total_questions),
        Cell::new(results.correct_answers),
        Cell::new(results.wrong_answers),
        Cell::new(format!("{:.1}%", results.percentage)),
        Cell::new(results.completed_at.format("%Y-%m-%d %H:%M UTC")),
    ]);
    table
}

/// One row per submitted answer, in submission order.
pub(crate) fn answers_table(results: &ExamResults, bank: Option<&QuestionBank>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Text", "Your answer", "Correct answer", "Result"]);
    for a in &results.answers {
        let text = bank
            .and_then(|b| b.find(a.question_id))
            .map(|q| truncate(&q.text, 60))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(a.question_id),
            Cell::new(text),
            Cell::new(option_letter(a.selected_index)),
            Cell::new(option_letter(a.correct_index)),
            Cell::new(if a.is_correct { "correct" } else { "wrong" }),
        ]);
    }
    table
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
