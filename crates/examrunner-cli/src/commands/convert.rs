//! The `examrunner convert` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examrunner_core::convert::convert_text;
use examrunner_core::model::QuestionBank;

pub fn execute(input: PathBuf, output: PathBuf, report_path: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let report = convert_text(&text);

    for r in &report.rejected {
        println!(
            "  [line {}] #{} skipped: {} ({})",
            r.line, r.source_number, r.reason, r.excerpt
        );
    }
    println!(
        "Converted {} of {} question block(s).",
        report.accepted.len(),
        report.blocks_seen()
    );

    if let Some(path) = &report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Conversion report: {}", path.display());
    }

    anyhow::ensure!(
        !report.accepted.is_empty(),
        "no questions could be converted from {}",
        input.display()
    );

    let bank = QuestionBank::new(report.accepted)
        .context("converted questions failed validation")?;

    let json = serde_json::to_string_pretty(&bank)?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {} question(s) to {}", bank.len(), output.display());

    Ok(())
}
