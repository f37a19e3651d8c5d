//! Data model shared by the judge client, storage, and CLI.

use serde::{Deserialize, Serialize};

/// One sample test case attached to a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTestCase {
    pub input: String,
    #[serde(default)]
    pub expected: String,
}

/// A LeetCode problem as fetched via GraphQL and stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub difficulty: String,
    /// HTML problem statement, saved verbatim.
    pub content: String,
    /// Starter code for the configured language.
    pub code_template: String,
    pub sample_test_cases: Vec<SampleTestCase>,
}

/// User configuration, stored at `~/.leetcode/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub editor: String,
    pub browser: String,
    pub profile: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "python3".into(),
            editor: "vim".into(),
            browser: "chrome".into(),
            profile: "Default".into(),
        }
    }
}

impl Config {
    /// Solution file extension for the configured language slug.
    pub fn solution_extension(&self) -> &'static str {
        match self.language.as_str() {
            "python" | "python3" => "py",
            "rust" => "rs",
            "cpp" => "cpp",
            "c" => "c",
            "java" => "java",
            "golang" => "go",
            "javascript" => "js",
            "typescript" => "ts",
            "kotlin" => "kt",
            "swift" => "swift",
            _ => "txt",
        }
    }
}

/// One submission payload. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub problem_id: u64,
    pub language: String,
    pub source_code: String,
}

/// Opaque polling key returned by a submit or test-run call. Lives for one
/// submission lifecycle only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionHandle(String);

impl SubmissionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Classified result of one poll cycle against the judge.
///
/// The judge's raw status vocabulary maps into this closed set;
/// anything unrecognized becomes [`PollOutcome::Unknown`] rather than a
/// guessed verdict, and callers must treat `Unknown` as not proven accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Still running; poll again.
    Pending,
    Accepted {
        /// e.g. `"40 ms"`, verbatim from the judge.
        runtime: String,
        /// e.g. `"14.2 MB"`, verbatim from the judge.
        memory: String,
        runtime_percentile: Option<f64>,
        memory_percentile: Option<f64>,
    },
    WrongAnswer {
        /// 1-based index of the first failing case.
        failing_case: u32,
        total_cases: u32,
        input: String,
        expected: String,
        actual: String,
    },
    RuntimeError(String),
    CompileError(String),
    TimeLimitExceeded,
    /// Unrecognized judge status, carried raw.
    Unknown(String),
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Pending)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, PollOutcome::Accepted { .. })
    }
}
