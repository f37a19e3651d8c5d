//! Command-line interface: argument definitions and command handlers.

use crate::error::{JudgeError, StorageError};
use crate::judge::SubmissionClient;
use crate::model::{PollOutcome, SubmissionRequest};
use crate::session::SessionManager;
use crate::storage::Storage;
use clap::{Parser, Subcommand};
use std::path::Path;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "lc", version, about = "Solve LeetCode problems from your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a problem from LeetCode and save it locally
    Fetch {
        /// Problem slug (e.g. "two-sum")
        slug: String,
    },
    /// Run the solution against the sample test cases
    Test {
        /// Problem slug (optional inside a problem directory)
        slug: Option<String>,
    },
    /// Submit the solution
    Submit {
        /// Problem slug (optional inside a problem directory)
        slug: Option<String>,
    },
    /// Print the problem statement
    Show {
        /// Problem slug (optional inside a problem directory)
        slug: Option<String>,
    },
    /// List locally saved problems
    List {
        /// Filter by difficulty (easy/medium/hard)
        #[arg(short, long)]
        difficulty: Option<String>,
        /// Maximum number of problems to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Open the solution file in the configured editor
    Open {
        /// Problem slug (optional inside a problem directory)
        slug: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Judge(#[from] JudgeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no slug given and not inside a problem directory; run `lc <command> <slug>` or cd to ~/.leetcode/problems/<slug>/")]
    NoSlug,
    #[error("failed to launch editor {editor}: {source}")]
    Editor {
        editor: String,
        source: std::io::Error,
    },
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let storage = Storage::new();

    match cli.command {
        Command::Fetch { slug } => fetch(&storage, &slug).await,
        Command::Test { slug } => {
            let slug = resolve_slug(slug, &storage)?;
            test(&storage, &slug).await
        }
        Command::Submit { slug } => {
            let slug = resolve_slug(slug, &storage)?;
            submit(&storage, &slug).await
        }
        Command::Show { slug } => {
            let slug = resolve_slug(slug, &storage)?;
            show(&storage, &slug)
        }
        Command::List { difficulty, limit } => {
            list(&storage, difficulty.as_deref(), limit);
            Ok(())
        }
        Command::Open { slug } => {
            let slug = resolve_slug(slug, &storage)?;
            open(&storage, &slug)
        }
    }
}

fn client(storage: &Storage) -> SubmissionClient<crate::session::ChromeCookieSource> {
    let sessions = SessionManager::new(
        &storage.config().profile,
        Some(storage.session_cache_path()),
    );
    SubmissionClient::new(sessions)
}

/// Use the explicit slug, or infer it from the current directory when inside
/// `~/.leetcode/problems/<slug>/`.
fn resolve_slug(slug: Option<String>, storage: &Storage) -> Result<String, CliError> {
    if let Some(slug) = slug {
        return Ok(slug);
    }

    let cwd = std::env::current_dir().map_err(|_| CliError::NoSlug)?;
    slug_from_dir(&cwd, &storage.problems_dir()).ok_or(CliError::NoSlug)
}

fn slug_from_dir(cwd: &Path, problems_dir: &Path) -> Option<String> {
    let relative = cwd.strip_prefix(problems_dir).ok()?;
    let first = relative.components().next()?;
    Some(first.as_os_str().to_string_lossy().into_owned())
}

async fn fetch(storage: &Storage, slug: &str) -> Result<(), CliError> {
    let mut client = client(storage);
    let problem = client.fetch_problem(slug, &storage.config().language).await?;
    println!("Fetching '{}'...", problem.title);

    let solution = storage.save_problem(&problem)?;
    let dir = solution.parent().unwrap_or(Path::new("."));
    println!("Created: {}/", dir.display());
    for name in ["problem.md", "metadata.json"] {
        println!("  - {name}");
    }
    if let Some(name) = solution.file_name() {
        println!("  - {}", name.to_string_lossy());
    }
    println!(
        "\nOpen with: {} {}",
        storage.config().editor,
        solution.display()
    );
    Ok(())
}

async fn submit(storage: &Storage, slug: &str) -> Result<(), CliError> {
    let problem = storage.load_problem(slug)?;
    let request = SubmissionRequest {
        problem_id: problem.id,
        language: storage.config().language.clone(),
        source_code: storage.solution_code(slug)?,
    };

    println!("Submitting '{}'...", problem.title);
    let outcome = client(storage).submit(slug, &request).await?;
    print_outcome(&outcome);
    Ok(())
}

async fn test(storage: &Storage, slug: &str) -> Result<(), CliError> {
    let problem = storage.load_problem(slug)?;
    let Some(case) = problem.sample_test_cases.first() else {
        println!("No sample test cases found.");
        return Ok(());
    };

    let request = SubmissionRequest {
        problem_id: problem.id,
        language: storage.config().language.clone(),
        source_code: storage.solution_code(slug)?,
    };

    println!("Running sample tests for '{}'...", problem.title);
    let outcome = client(storage)
        .run_sample_tests(slug, &request, &case.input)
        .await?;
    print_outcome(&outcome);
    Ok(())
}

fn show(storage: &Storage, slug: &str) -> Result<(), CliError> {
    let problem = storage.load_problem(slug)?;
    println!("\n{} ({})\n", problem.title, problem.difficulty);
    println!("{}", problem.content);
    Ok(())
}

fn list(storage: &Storage, difficulty: Option<&str>, limit: usize) {
    let slugs = storage.list_problems();
    if slugs.is_empty() {
        println!("No problems saved locally.");
        println!("Use 'lc fetch <slug>' to fetch a problem.");
        return;
    }

    let mut shown = 0usize;
    for slug in slugs {
        if shown >= limit {
            break;
        }
        let Ok(problem) = storage.load_problem(&slug) else {
            continue;
        };
        if let Some(wanted) = difficulty {
            if !problem.difficulty.eq_ignore_ascii_case(wanted) {
                continue;
            }
        }
        println!("{:<30} {:<40} {}", problem.slug, problem.title, problem.difficulty);
        shown += 1;
    }

    if shown == 0 {
        println!(
            "No problems found with difficulty '{}'.",
            difficulty.unwrap_or_default()
        );
    }
}

fn open(storage: &Storage, slug: &str) -> Result<(), CliError> {
    let solution = storage.solution_file(slug)?;
    let editor = storage.config().editor.clone();
    std::process::Command::new(&editor)
        .arg(&solution)
        .status()
        .map_err(|source| CliError::Editor { editor, source })?;
    Ok(())
}

fn print_outcome(outcome: &PollOutcome) {
    match outcome {
        PollOutcome::Accepted {
            runtime,
            memory,
            runtime_percentile,
            memory_percentile,
        } => {
            println!("Accepted");
            if !runtime.is_empty() {
                println!("  Runtime: {runtime}{}", beats(runtime_percentile));
            }
            if !memory.is_empty() {
                println!("  Memory: {memory}{}", beats(memory_percentile));
            }
        }
        PollOutcome::WrongAnswer {
            failing_case,
            total_cases,
            input,
            expected,
            actual,
        } => {
            println!("Wrong Answer");
            println!("  Test case {failing_case}/{total_cases} failed");
            println!("  Input: {input}");
            println!("  Expected: {expected}");
            println!("  Actual: {actual}");
        }
        PollOutcome::RuntimeError(message) => {
            println!("Runtime Error");
            println!("  {message}");
        }
        PollOutcome::CompileError(message) => {
            println!("Compile Error");
            println!("  {message}");
        }
        PollOutcome::TimeLimitExceeded => println!("Time Limit Exceeded"),
        PollOutcome::Unknown(raw) => println!("Unrecognized judge status: {raw}"),
        PollOutcome::Pending => println!("Still pending"),
    }
}

fn beats(percentile: &Option<f64>) -> String {
    match percentile {
        Some(p) => format!(" (beats {p:.0}%)"),
        None => String::new(),
    }
}
