//! examrunner CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "examrunner", version, about = "Multiple-choice exam runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam interactively in the terminal
    Take {
        /// Path to a question bank JSON file
        #[arg(long, conflicts_with = "url")]
        questions: Option<PathBuf>,

        /// URL to fetch the question bank from
        #[arg(long)]
        url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the results when the exam ends
        #[arg(long)]
        save: bool,

        /// Output format for saved results: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Quit without asking for confirmation
        #[arg(long)]
        no_confirm: bool,
    },

    /// Validate a question bank JSON file
    Validate {
        /// Path to the question bank
        #[arg(long)]
        questions: PathBuf,

        /// Warn when the bank does not hold this many questions
        #[arg(long)]
        expected_count: Option<usize>,
    },

    /// Convert a plain-text question dump into a question bank
    Convert {
        /// Text file to read
        #[arg(long)]
        input: PathBuf,

        /// Question bank JSON to write
        #[arg(long)]
        output: PathBuf,

        /// Also write the conversion report (accepted and rejected blocks) as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show saved exam results
    Show {
        /// Results JSON file
        #[arg(long)]
        results: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also write an HTML report to this path
        #[arg(long)]
        html: Option<PathBuf>,

        /// Question bank used for the exam, to include question texts
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("examrunner=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            questions,
            url,
            config,
            save,
            format,
            output,
            no_confirm,
        } => {
            commands::take::execute(questions, url, config, save, format, output, no_confirm).await
        }
        Commands::Validate {
            questions,
            expected_count,
        } => commands::validate::execute(questions, expected_count),
        Commands::Convert {
            input,
            output,
            report,
        } => commands::convert::execute(input, output, report),
        Commands::Show {
            results,
            format,
            html,
            questions,
        } => commands::show::execute(results, format, html, questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
