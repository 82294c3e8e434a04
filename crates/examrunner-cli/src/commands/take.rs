//! The `examrunner take` command: an interactive exam in the terminal.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use examrunner_core::model::{option_letter, parse_option_label, QuestionBank, QuestionStatus, Stage};
use examrunner_core::parser::validate_question_bank;
use examrunner_core::report::ExamResults;
use examrunner_core::session::{ExamSession, SubmitOutcome};
use examrunner_core::traits::{load_from_source, TracingObserver};
use examrunner_report::html::write_html_report;
use examrunner_sources::http::DEFAULT_TIMEOUT_SECS;
use examrunner_sources::{create_source, load_config_from, SourceConfig};

use super::show::{answers_table, summary_table};

/// Formats results can be saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Html,
    Markdown,
}

fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    if format == "all" {
        return Ok(vec![
            OutputFormat::Json,
            OutputFormat::Html,
            OutputFormat::Markdown,
        ]);
    }
    format
        .split(',')
        .map(|f| match f.trim() {
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => anyhow::bail!("unknown format: '{other}'"),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    questions: Option<PathBuf>,
    url: Option<String>,
    config_path: Option<PathBuf>,
    save: bool,
    format: String,
    output: Option<PathBuf>,
    no_confirm: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let formats = parse_formats(&format)?;

    let source_config = match (questions, url) {
        (Some(path), _) => SourceConfig::File { path },
        (None, Some(url)) => SourceConfig::Http {
            url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        },
        (None, None) => config.source.clone(),
    };

    let source = create_source(&source_config)?;
    let bank = load_from_source(source.as_ref())
        .await
        .with_context(|| format!("failed to load questions from {}", source.describe()))?;
    tracing::info!("loaded {} questions from {}", bank.len(), source.describe());

    for w in validate_question_bank(&bank, config.expected_count) {
        eprintln!("Warning: {}", w.message);
    }

    let bank = Arc::new(bank);
    let mut session = ExamSession::new(Arc::clone(&bank)).with_observer(Arc::new(TracingObserver));
    let output_dir = output.unwrap_or(config.output_dir);
    let confirm_quit = config.confirm_quit && !no_confirm;

    let mut on_result = |results: &ExamResults| -> Result<()> {
        if save {
            save_results(results, &bank, &output_dir, &formats)?;
        }
        Ok(())
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(
        &mut session,
        stdin.lock(),
        stdout.lock(),
        confirm_quit,
        &mut on_result,
    )
}

fn save_results(
    results: &ExamResults,
    bank: &QuestionBank,
    output_dir: &Path,
    formats: &[OutputFormat],
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let json_path = output_dir.join(results.default_file_name());

    for fmt in formats {
        match fmt {
            OutputFormat::Json => {
                results.save_json(&json_path)?;
                eprintln!("Results saved to: {}", json_path.display());
            }
            OutputFormat::Html => {
                let path = json_path.with_extension("html");
                write_html_report(results, Some(bank), &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            OutputFormat::Markdown => {
                let path = json_path.with_extension("md");
                std::fs::write(&path, results.to_markdown(Some(bank)))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Markdown summary: {}", path.display());
            }
        }
    }
    Ok(())
}

/// Drive a session from line-based input until the user exits or input ends.
///
/// `on_result` is called once each time the result stage is reached.
pub(crate) fn run_session<R: BufRead, W: Write>(
    session: &mut ExamSession,
    mut input: R,
    mut out: W,
    confirm_quit: bool,
    on_result: &mut dyn FnMut(&ExamResults) -> Result<()>,
) -> Result<()> {
    let mut reported = false;

    loop {
        match session.stage() {
            Stage::Intro => {
                reported = false;
                writeln!(
                    out,
                    "\n{} multiple-choice questions. Answer with a-d (or 1-4).",
                    session.question_count()
                )?;
                writeln!(out, "Press Enter to start, x to exit.")?;
                let Some(line) = prompt(&mut input, &mut out)? else {
                    return Ok(());
                };
                match line.as_str() {
                    "" | "start" => session.start()?,
                    "x" | "exit" => return Ok(()),
                    other => writeln!(out, "Unknown command '{other}'.")?,
                }
            }
            Stage::Exam { current_index } => {
                render_question(session, current_index, &mut out)?;
                let Some(line) = prompt(&mut input, &mut out)? else {
                    return Ok(());
                };
                let keep_going = exam_command(
                    session,
                    current_index,
                    &line,
                    &mut input,
                    &mut out,
                    confirm_quit,
                )?;
                if !keep_going {
                    return Ok(());
                }
            }
            Stage::Result => {
                if !reported {
                    reported = true;
                    let results = session.results()?;
                    render_results(&results, session.bank(), &mut out)?;
                    on_result(&results)?;
                }
                writeln!(out, "r) restart  x) exit")?;
                let Some(line) = prompt(&mut input, &mut out)? else {
                    return Ok(());
                };
                match line.as_str() {
                    "r" | "restart" => session.restart(),
                    "" | "x" | "exit" => return Ok(()),
                    other => writeln!(out, "Unknown command '{other}'.")?,
                }
            }
        }
    }
}

/// Handle one line typed during the exam. Returns `false` to exit.
fn exam_command<R: BufRead, W: Write>(
    session: &mut ExamSession,
    current_index: usize,
    line: &str,
    input: &mut R,
    out: &mut W,
    confirm_quit: bool,
) -> Result<bool> {
    match line {
        "s" | "skip" => {
            session.skip()?;
        }
        "n" | "next" => {
            session.next()?;
        }
        "p" | "prev" => {
            if current_index == 0 {
                writeln!(out, "Already at the first question.")?;
            } else {
                session.navigate_to(current_index - 1)?;
            }
        }
        "grid" => render_grid(session, out)?,
        "g" | "goto" => writeln!(out, "Usage: g <question number>")?,
        "q" | "quit" => {
            let confirmed = !confirm_quit
                || confirm(
                    input,
                    out,
                    "Quit the exam? Unanswered questions will not be scored. [y/N]",
                )?;
            if confirmed {
                session.quit()?;
            }
        }
        "r" | "restart" => session.restart(),
        "x" | "exit" => return Ok(false),
        "?" | "h" | "help" => render_help(out)?,
        other => {
            if let Some(target) = other
                .strip_prefix("g ")
                .or_else(|| other.strip_prefix("goto "))
            {
                match target.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => {
                        if let Err(e) = session.navigate_to(n - 1) {
                            writeln!(out, "{e}")?;
                        }
                    }
                    _ => writeln!(out, "Usage: g <question number>")?,
                }
            } else if let Some(selected) = parse_option_label(other) {
                match session.submit(selected) {
                    Ok(SubmitOutcome::Recorded(answer)) => {
                        if answer.is_correct {
                            writeln!(out, "Correct!")?;
                        } else {
                            let correct = session
                                .current_question()
                                .map(|q| q.correct_option().to_string())
                                .unwrap_or_default();
                            writeln!(
                                out,
                                "Wrong. The correct answer is {}) {}.",
                                option_letter(answer.correct_index),
                                correct
                            )?;
                        }
                        writeln!(out, "Press n for the next question.")?;
                    }
                    Ok(SubmitOutcome::AlreadyAnswered) => {
                        writeln!(out, "You have already answered this question.")?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            } else {
                writeln!(out, "Unknown command '{other}'. Type ? for help.")?;
            }
        }
    }
    Ok(true)
}

fn render_question<W: Write>(session: &ExamSession, index: usize, out: &mut W) -> Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let progress = session.progress();
    let status = session.status_of(index).unwrap_or_default();

    writeln!(
        out,
        "\nQuestion {} of {}  [answered {} | correct {} | wrong {} | skipped {}]",
        index + 1,
        progress.total,
        progress.answered,
        progress.correct,
        progress.wrong,
        progress.skipped
    )?;
    writeln!(out, "{}", question.text)?;
    for (i, option) in question.options.iter().enumerate() {
        let marker = match status {
            QuestionStatus::Answered { selected_index, .. } if selected_index == i => {
                " <- your answer"
            }
            _ => "",
        };
        writeln!(out, "  {}) {}{}", option_letter(i), option, marker)?;
    }
    if status.is_skipped() {
        writeln!(out, "(skipped)")?;
    }
    Ok(())
}

fn render_grid<W: Write>(session: &ExamSession, out: &mut W) -> Result<()> {
    let current = session.stage().current_index();
    let cells: Vec<String> = session
        .statuses()
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let mark = match status {
                QuestionStatus::Unanswered => '.',
                QuestionStatus::Skipped => 's',
                QuestionStatus::Answered {
                    is_correct: true, ..
                } => '+',
                QuestionStatus::Answered {
                    is_correct: false, ..
                } => '-',
            };
            if current == Some(i) {
                format!("[{:>3}{mark}]", i + 1)
            } else {
                format!(" {:>3}{mark} ", i + 1)
            }
        })
        .collect();

    for row in cells.chunks(10) {
        writeln!(out, "{}", row.join(""))?;
    }
    writeln!(out, "+ correct  - wrong  s skipped  . unanswered")?;
    Ok(())
}

fn render_results<W: Write>(results: &ExamResults, bank: &QuestionBank, out: &mut W) -> Result<()> {
    writeln!(out, "\nExam finished: {:.1}% {}", results.percentage, results.band())?;
    writeln!(out, "{}", summary_table(results))?;
    if results.answers.is_empty() {
        writeln!(out, "No questions were answered.")?;
    } else {
        writeln!(out, "{}", answers_table(results, Some(bank)))?;
    }
    Ok(())
}

fn render_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "  a-d or 1-4   answer the current question")?;
    writeln!(out, "  n            next question")?;
    writeln!(out, "  p            previous question")?;
    writeln!(out, "  s            skip")?;
    writeln!(out, "  g N          go to question N")?;
    writeln!(out, "  grid         show all question statuses")?;
    writeln!(out, "  q            quit and see results")?;
    writeln!(out, "  r            restart")?;
    writeln!(out, "  x            exit without results")?;
    Ok(())
}

/// Read one trimmed, lowercased line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<String>> {
    write!(out, "> ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    writeln!(out, "{question}")?;
    Ok(matches!(
        prompt(input, out)?.as_deref(),
        Some("y") | Some("yes")
    ))
}
