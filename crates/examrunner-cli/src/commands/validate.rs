//! The `examrunner validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examrunner_core::error::LoadError;
use examrunner_core::parser::{load_question_file, validate_question_bank};

pub fn execute(questions_path: PathBuf, expected_count: Option<usize>) -> Result<()> {
    let bank = match load_question_file(&questions_path) {
        Ok(bank) => bank,
        Err(LoadError::InvalidQuestions(issues)) => {
            println!("Question bank: {}", questions_path.display());
            for issue in &issues {
                println!("  ERROR: {issue}");
            }
            anyhow::bail!(
                "{} invalid question(s) in {}",
                issues.len(),
                questions_path.display()
            );
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Question bank: {} ({} questions)",
        questions_path.display(),
        bank.len()
    );

    let warnings = validate_question_bank(&bank, expected_count);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
