//! Local problem and configuration storage under `~/.leetcode/`.
//!
//! Layout per problem: `problems/<slug>/problem.md` (statement),
//! `solution.<ext>` (working file), `metadata.json` (id, title, difficulty,
//! sample cases). Plain synchronous file I/O; nothing here touches the
//! network or the cookie store.

use crate::error::StorageError;
use crate::model::{Config, Problem, SampleTestCase};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PROBLEM_FILE: &str = "problem.md";
const METADATA_FILE: &str = "metadata.json";
const CONFIG_FILE: &str = "config.json";
const SESSION_CACHE_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
struct ProblemMetadata {
    id: u64,
    slug: String,
    title: String,
    difficulty: String,
    sample_test_cases: Vec<SampleTestCase>,
}

/// File layout manager rooted at one base directory.
pub struct Storage {
    base: PathBuf,
    config: Config,
}

impl Storage {
    /// Storage at the default `~/.leetcode` location.
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".leetcode");
        Self::with_base(base)
    }

    pub fn with_base(base: PathBuf) -> Self {
        let config = load_config(&base.join(CONFIG_FILE));
        Self { base, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn problems_dir(&self) -> PathBuf {
        self.base.join("problems")
    }

    /// Where the session hint is cached between invocations.
    pub fn session_cache_path(&self) -> PathBuf {
        self.base.join(SESSION_CACHE_FILE)
    }

    fn problem_dir(&self, slug: &str) -> PathBuf {
        self.problems_dir().join(slug)
    }

    fn solution_path(&self, slug: &str) -> PathBuf {
        self.problem_dir(slug)
            .join(format!("solution.{}", self.config.solution_extension()))
    }

    /// Save a fetched problem. Returns the solution file path.
    pub fn save_problem(&self, problem: &Problem) -> Result<PathBuf, StorageError> {
        let dir = self.problem_dir(&problem.slug);
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

        let statement = dir.join(PROBLEM_FILE);
        std::fs::write(&statement, &problem.content).map_err(|e| io_err(&statement, e))?;

        let solution = self.solution_path(&problem.slug);
        // Never clobber work in progress on a re-fetch.
        if !solution.exists() {
            std::fs::write(&solution, &problem.code_template)
                .map_err(|e| io_err(&solution, e))?;
        }

        let metadata = ProblemMetadata {
            id: problem.id,
            slug: problem.slug.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty.clone(),
            sample_test_cases: problem.sample_test_cases.clone(),
        };
        let metadata_path = dir.join(METADATA_FILE);
        let json = serde_json::to_string_pretty(&metadata).map_err(|e| StorageError::Metadata {
            path: metadata_path.clone(),
            source: e,
        })?;
        std::fs::write(&metadata_path, json).map_err(|e| io_err(&metadata_path, e))?;

        Ok(solution)
    }

    pub fn load_problem(&self, slug: &str) -> Result<Problem, StorageError> {
        if !self.problem_exists(slug) {
            return Err(StorageError::ProblemNotFound(slug.to_string()));
        }

        let dir = self.problem_dir(slug);
        let statement = dir.join(PROBLEM_FILE);
        let content = std::fs::read_to_string(&statement).map_err(|e| io_err(&statement, e))?;

        let solution = self.solution_path(slug);
        let code_template =
            std::fs::read_to_string(&solution).map_err(|e| io_err(&solution, e))?;

        let metadata_path = dir.join(METADATA_FILE);
        let raw = std::fs::read_to_string(&metadata_path).map_err(|e| io_err(&metadata_path, e))?;
        let metadata: ProblemMetadata =
            serde_json::from_str(&raw).map_err(|e| StorageError::Metadata {
                path: metadata_path,
                source: e,
            })?;

        Ok(Problem {
            id: metadata.id,
            slug: metadata.slug,
            title: metadata.title,
            difficulty: metadata.difficulty,
            content,
            code_template,
            sample_test_cases: metadata.sample_test_cases,
        })
    }

    /// Current contents of the solution file.
    pub fn solution_code(&self, slug: &str) -> Result<String, StorageError> {
        if !self.problem_exists(slug) {
            return Err(StorageError::ProblemNotFound(slug.to_string()));
        }
        let path = self.solution_path(slug);
        std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))
    }

    pub fn solution_file(&self, slug: &str) -> Result<PathBuf, StorageError> {
        if !self.problem_exists(slug) {
            return Err(StorageError::ProblemNotFound(slug.to_string()));
        }
        Ok(self.solution_path(slug))
    }

    pub fn problem_exists(&self, slug: &str) -> bool {
        let dir = self.problem_dir(slug);
        dir.join(PROBLEM_FILE).exists()
            && self.solution_path(slug).exists()
            && dir.join(METADATA_FILE).exists()
    }

    /// Slugs of every completely saved problem, sorted.
    pub fn list_problems(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.problems_dir()) else {
            return Vec::new();
        };
        let mut slugs: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|slug| self.problem_exists(slug))
            .collect();
        slugs.sort();
        slugs
    }

    pub fn save_config(&mut self, config: Config) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base).map_err(|e| io_err(&self.base, e))?;
        let path = self.base.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(&config).map_err(|e| StorageError::Metadata {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| io_err(&path, e))?;
        self.config = config;
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

fn load_config(path: &Path) -> Config {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt config");
            Config::default()
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}
