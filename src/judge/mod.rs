//! Submission lifecycle against the LeetCode judge.
//!
//! [`SubmissionClient`] issues submit / test-run / problem-fetch requests
//! with the session headers, polls the check endpoint until the judge
//! reaches a terminal state, and maps the judge's raw status vocabulary into
//! [`PollOutcome`]. Auth-class rejections (401/403) invalidate the session
//! and re-acquire it exactly once per logical operation; a second rejection
//! is surfaced as [`AuthError::SessionExpired`].

pub mod transport;

use crate::error::{AuthError, JudgeError};
use crate::model::{PollOutcome, Problem, SampleTestCase, SubmissionHandle, SubmissionRequest};
use crate::session::{CookieSource, Session, SessionManager, CSRF_COOKIE, SESSION_COOKIE};
use serde::Deserialize;
use std::time::Duration;
use transport::{HttpResponse, Transport};

pub const BASE_URL: &str = "https://leetcode.com";

/// Fixed poll cadence. The judge usually resolves in low seconds; the
/// interval is also the hard floor that keeps polling from flooding.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wall-clock ceiling expressed in poll attempts (~30 s at the fixed
/// interval). Exhausting it yields `PollTimeout`, never a verdict.
pub const MAX_POLL_ATTEMPTS: u32 = 30;

const PROBLEM_QUERY: &str = r#"
query getQuestionDetail($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
    title
    titleSlug
    difficulty
    content
    codeSnippets {
      lang
      langSlug
      code
    }
    sampleTestCase
    exampleTestcases
  }
}
"#;

enum Payload<'a> {
    Get,
    PostJson(&'a serde_json::Value),
}

/// Client for one interactive user submitting one solution at a time.
/// Owns the [`SessionManager`]; no concurrent submissions, no shared state.
pub struct SubmissionClient<S: CookieSource> {
    transport: Box<dyn Transport>,
    sessions: SessionManager<S>,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
    /// One invalidate-and-retry allowed per logical operation.
    auth_retried: bool,
}

impl SubmissionClient<crate::session::ChromeCookieSource> {
    pub fn new(sessions: SessionManager) -> Self {
        Self::with_transport(Box::new(transport::ReqwestTransport::new()), sessions, BASE_URL)
    }
}

impl<S: CookieSource> SubmissionClient<S> {
    pub fn with_transport(
        transport: Box<dyn Transport>,
        sessions: SessionManager<S>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sessions,
            base_url: base_url.into(),
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLL_ATTEMPTS,
            auth_retried: false,
        }
    }

    /// Override the poll cadence and ceiling.
    pub fn poll_policy(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// Submit a solution and track it to a terminal verdict.
    pub async fn submit(
        &mut self,
        slug: &str,
        request: &SubmissionRequest,
    ) -> Result<PollOutcome, JudgeError> {
        self.auth_retried = false;
        let url = format!("{}/problems/{}/submit/", self.base_url, slug);
        let body = serde_json::json!({
            "lang": request.language,
            "question_id": request.problem_id.to_string(),
            "typed_code": request.source_code,
        });
        tracing::debug!(slug = %slug, lang = %request.language, "submitting solution");
        let handle = self.start_run(&url, &body, "submission_id").await?;
        self.poll(&handle).await
    }

    /// Run a solution against sample input. Same submit-then-poll shape as
    /// [`submit`](Self::submit), different endpoint and handle key.
    pub async fn run_sample_tests(
        &mut self,
        slug: &str,
        request: &SubmissionRequest,
        data_input: &str,
    ) -> Result<PollOutcome, JudgeError> {
        self.auth_retried = false;
        let url = format!("{}/problems/{}/interpret_solution/", self.base_url, slug);
        let body = serde_json::json!({
            "lang": request.language,
            "question_id": request.problem_id.to_string(),
            "typed_code": request.source_code,
            "data_input": data_input,
        });
        tracing::debug!(slug = %slug, "running sample tests");
        let handle = self.start_run(&url, &body, "interpret_id").await?;
        self.poll(&handle).await
    }

    /// Fetch problem details via GraphQL.
    pub async fn fetch_problem(
        &mut self,
        slug: &str,
        language: &str,
    ) -> Result<Problem, JudgeError> {
        self.auth_retried = false;
        let url = format!("{}/graphql/", self.base_url);
        let body = serde_json::json!({
            "query": PROBLEM_QUERY,
            "variables": { "titleSlug": slug },
        });

        let response = self.send_authorized(&url, Payload::PostJson(&body)).await?;
        if response.status != 200 {
            return Err(JudgeError::UnexpectedStatus {
                status: response.status,
                url,
            });
        }

        let value: serde_json::Value = parse_json(&url, &response.body)?;
        let question = match value.pointer("/data/question") {
            Some(q) if !q.is_null() => q,
            _ => return Err(JudgeError::ProblemNotFound(slug.to_string())),
        };

        let id = match question.get("questionId") {
            Some(serde_json::Value::String(s)) => s.parse::<u64>().ok(),
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| JudgeError::MalformedResponse {
            url: url.clone(),
            message: "missing questionId".into(),
        })?;

        let str_field = |name: &str| {
            question
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let code_template = question
            .get("codeSnippets")
            .and_then(|v| v.as_array())
            .and_then(|snippets| {
                snippets.iter().find(|s| {
                    s.get("langSlug").and_then(|v| v.as_str()) == Some(language)
                })
            })
            .and_then(|s| s.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        // exampleTestcases supersedes sampleTestCase when present.
        let example = str_field("exampleTestcases");
        let sample = str_field("sampleTestCase");
        let test_input = if example.is_empty() { sample } else { example };
        let sample_test_cases = if test_input.is_empty() {
            Vec::new()
        } else {
            vec![SampleTestCase {
                input: test_input.trim().to_string(),
                expected: String::new(),
            }]
        };

        Ok(Problem {
            id,
            slug: str_field("titleSlug"),
            title: str_field("title"),
            difficulty: str_field("difficulty"),
            content: str_field("content"),
            code_template,
            sample_test_cases,
        })
    }

    /// POST the run request and extract the polling handle.
    async fn start_run(
        &mut self,
        url: &str,
        body: &serde_json::Value,
        id_field: &str,
    ) -> Result<SubmissionHandle, JudgeError> {
        let response = self.send_authorized(url, Payload::PostJson(body)).await?;
        if response.status != 200 {
            return Err(JudgeError::UnexpectedStatus {
                status: response.status,
                url: url.to_string(),
            });
        }

        let value: serde_json::Value = parse_json(url, &response.body)?;
        let id = match value.get(id_field) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(JudgeError::MalformedResponse {
                    url: url.to_string(),
                    message: format!("missing {id_field}"),
                })
            }
        };

        tracing::debug!(handle = %id, "run started");
        Ok(SubmissionHandle::new(id))
    }

    /// Poll the check endpoint at the fixed interval until a terminal state
    /// or the attempt ceiling. Blocking flow; one handle in flight at a time.
    async fn poll(&mut self, handle: &SubmissionHandle) -> Result<PollOutcome, JudgeError> {
        let url = format!("{}/submissions/detail/{}/check/", self.base_url, handle.id());

        let mut attempts = 0u32;
        while attempts < self.max_polls {
            let response = self.send_authorized(&url, Payload::Get).await?;
            if response.status != 200 {
                return Err(JudgeError::UnexpectedStatus {
                    status: response.status,
                    url,
                });
            }

            let check: CheckResponse = parse_json(&url, &response.body)?;
            let outcome = classify(&check);
            if outcome.is_terminal() {
                tracing::debug!(handle = %handle.id(), attempts, "judge reached terminal state");
                return Ok(outcome);
            }

            attempts += 1;
            if attempts < self.max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(JudgeError::PollTimeout { attempts })
    }

    /// Send one request with session headers, invalidating and re-acquiring
    /// the session on the first auth-class status of the operation. A second
    /// auth rejection ends the operation with `SessionExpired`.
    async fn send_authorized(
        &mut self,
        url: &str,
        payload: Payload<'_>,
    ) -> Result<HttpResponse, JudgeError> {
        loop {
            let session = self.sessions.get_session()?;
            let headers = auth_headers(&session, &self.base_url);
            let response = match &payload {
                Payload::Get => self.transport.get(url, &headers).await?,
                Payload::PostJson(body) => self.transport.post_json(url, &headers, body).await?,
            };

            if self.sessions.on_response_status(response.status) {
                if self.auth_retried {
                    return Err(JudgeError::Auth(AuthError::SessionExpired));
                }
                tracing::debug!(status = response.status, "auth rejected; re-acquiring session");
                self.sessions.invalidate();
                self.auth_retried = true;
                continue;
            }

            return Ok(response);
        }
    }
}

/// Session and anti-forgery headers required by every judge request.
fn auth_headers(session: &Session, referer: &str) -> Vec<(String, String)> {
    vec![
        (
            "Cookie".to_string(),
            format!(
                "{SESSION_COOKIE}={}; {CSRF_COOKIE}={}",
                session.token, session.csrf_token
            ),
        ),
        ("X-CSRFToken".to_string(), session.csrf_token.clone()),
        ("Referer".to_string(), referer.to_string()),
    ]
}

fn parse_json<T: serde::de::DeserializeOwned>(url: &str, body: &str) -> Result<T, JudgeError> {
    serde_json::from_str(body).map_err(|e| JudgeError::MalformedResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Raw check-endpoint payload. Every field optional; the judge omits most of
/// them depending on state and verdict.
#[derive(Debug, Deserialize)]
struct CheckResponse {
    state: Option<String>,
    status_msg: Option<String>,
    status_runtime: Option<String>,
    status_memory: Option<String>,
    runtime_percentile: Option<f64>,
    memory_percentile: Option<f64>,
    total_correct: Option<u32>,
    total_testcases: Option<u32>,
    #[serde(alias = "last_testcase")]
    input_formatted: Option<String>,
    expected_output: Option<String>,
    code_output: Option<serde_json::Value>,
    runtime_error: Option<String>,
    full_runtime_error: Option<String>,
    compile_error: Option<String>,
    full_compile_error: Option<String>,
}

/// Map the judge's raw vocabulary into the closed verdict set. Anything
/// unrecognized becomes `Unknown(raw)`; the client never guesses a verdict.
fn classify(check: &CheckResponse) -> PollOutcome {
    let state = check.state.as_deref().unwrap_or("");
    match state {
        "PENDING" | "STARTED" => PollOutcome::Pending,
        "SUCCESS" => classify_verdict(check),
        other => PollOutcome::Unknown(other.to_string()),
    }
}

fn classify_verdict(check: &CheckResponse) -> PollOutcome {
    let status_msg = check.status_msg.as_deref().unwrap_or("");
    match status_msg {
        "Accepted" => PollOutcome::Accepted {
            runtime: check.status_runtime.clone().unwrap_or_default(),
            memory: check.status_memory.clone().unwrap_or_default(),
            runtime_percentile: check.runtime_percentile,
            memory_percentile: check.memory_percentile,
        },
        "Wrong Answer" => PollOutcome::WrongAnswer {
            // The judge stops at the first failure, so the failing case is
            // the one after the last correct count.
            failing_case: check.total_correct.unwrap_or(0) + 1,
            total_cases: check.total_testcases.unwrap_or(0),
            input: check.input_formatted.clone().unwrap_or_default(),
            expected: check.expected_output.clone().unwrap_or_default(),
            actual: check
                .code_output
                .as_ref()
                .map(json_to_text)
                .unwrap_or_default(),
        },
        "Runtime Error" => PollOutcome::RuntimeError(
            check
                .full_runtime_error
                .clone()
                .or_else(|| check.runtime_error.clone())
                .unwrap_or_else(|| status_msg.to_string()),
        ),
        "Compile Error" => PollOutcome::CompileError(
            check
                .full_compile_error
                .clone()
                .or_else(|| check.compile_error.clone())
                .unwrap_or_else(|| status_msg.to_string()),
        ),
        "Time Limit Exceeded" => PollOutcome::TimeLimitExceeded,
        other => PollOutcome::Unknown(other.to_string()),
    }
}

/// The judge returns `code_output` as a string on submissions and as a list
/// of lines on sample runs.
fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
