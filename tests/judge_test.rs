//! Submission lifecycle: submit, poll, verdict classification, auth retry.

mod common;

use common::{encrypted_row, ScriptedTransport, StaticSource};
use lc::cookies::fallback_key;
use lc::error::{AuthError, JudgeError};
use lc::judge::SubmissionClient;
use lc::model::{PollOutcome, SubmissionRequest};
use lc::session::SessionManager;
use std::time::Duration;

fn client_with(
    transport: &ScriptedTransport,
) -> (
    SubmissionClient<StaticSource>,
    std::sync::Arc<std::sync::atomic::AtomicUsize>,
) {
    let key = fallback_key();
    let source = StaticSource::new(vec![
        encrypted_row("LEETCODE_SESSION", "session-token", &key),
        encrypted_row("csrftoken", "csrf-token", &key),
    ]);
    let reads = source.reads.clone();
    let sessions = SessionManager::with_parts(source, vec![fallback_key()], None);
    let client =
        SubmissionClient::with_transport(Box::new(transport.clone()), sessions, "https://leetcode.com");
    (client, reads)
}

fn request() -> SubmissionRequest {
    SubmissionRequest {
        problem_id: 1,
        language: "python3".into(),
        source_code: "class Solution:\n    pass\n".into(),
    }
}

const PENDING: &str = r#"{"state": "PENDING"}"#;

#[tokio::test(start_paused = true)]
async fn submit_polls_until_accepted() {
    let transport = ScriptedTransport::new(vec![
        (200, r#"{"submission_id": 123456789}"#),
        (200, PENDING),
        (200, PENDING),
        (
            200,
            r#"{
                "state": "SUCCESS",
                "status_msg": "Accepted",
                "status_runtime": "40 ms",
                "runtime_percentile": 95.5,
                "status_memory": "14.2 MB",
                "memory_percentile": 80.3,
                "total_correct": 57,
                "total_testcases": 57
            }"#,
        ),
    ]);
    let (mut client, _) = client_with(&transport);

    let outcome = client.submit("two-sum", &request()).await.unwrap();
    assert_eq!(
        outcome,
        PollOutcome::Accepted {
            runtime: "40 ms".into(),
            memory: "14.2 MB".into(),
            runtime_percentile: Some(95.5),
            memory_percentile: Some(80.3),
        }
    );

    // One submit plus exactly three polls.
    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].0, "POST");
    assert!(requests[0].1.ends_with("/problems/two-sum/submit/"));
    assert!(requests[1].1.ends_with("/submissions/detail/123456789/check/"));
}

#[tokio::test(start_paused = true)]
async fn wrong_answer_carries_the_failing_case_verbatim() {
    let transport = ScriptedTransport::new(vec![
        (200, r#"{"submission_id": 42}"#),
        (
            200,
            r#"{
                "state": "SUCCESS",
                "status_msg": "Wrong Answer",
                "total_correct": 2,
                "total_testcases": 55,
                "input_formatted": "[3,2,4], target=6",
                "expected_output": "[1,2]",
                "code_output": "[0,1]"
            }"#,
        ),
    ]);
    let (mut client, _) = client_with(&transport);

    let outcome = client.submit("two-sum", &request()).await.unwrap();
    assert_eq!(
        outcome,
        PollOutcome::WrongAnswer {
            failing_case: 3,
            total_cases: 55,
            input: "[3,2,4], target=6".into(),
            expected: "[1,2]".into(),
            actual: "[0,1]".into(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn auth_rejection_reacquires_once_then_gives_up() {
    // 403 on submit, 403 again after re-acquisition: terminal SessionExpired,
    // no further retries.
    let transport = ScriptedTransport::new(vec![(403, ""), (403, "")]);
    let (mut client, reads) = client_with(&transport);

    let err = client.submit("two-sum", &request()).await.unwrap_err();
    assert!(matches!(err, JudgeError::Auth(AuthError::SessionExpired)));

    assert_eq!(transport.request_count(), 2);
    // The cookie store was consulted twice: initial acquisition + one retry.
    assert_eq!(StaticSource::read_count(&reads), 2);
}

#[tokio::test(start_paused = true)]
async fn auth_rejection_recovers_after_reacquisition() {
    let transport = ScriptedTransport::new(vec![
        (401, ""),
        (200, r#"{"submission_id": 7}"#),
        (
            200,
            r#"{"state": "SUCCESS", "status_msg": "Time Limit Exceeded"}"#,
        ),
    ]);
    let (mut client, reads) = client_with(&transport);

    let outcome = client.submit("two-sum", &request()).await.unwrap();
    assert_eq!(outcome, PollOutcome::TimeLimitExceeded);
    assert_eq!(StaticSource::read_count(&reads), 2);
}

#[tokio::test(start_paused = true)]
async fn poll_ceiling_yields_timeout_not_a_verdict() {
    let mut script = vec![(200, r#"{"submission_id": 9}"#)];
    script.extend(std::iter::repeat((200, PENDING)).take(5));
    let transport = ScriptedTransport::new(script);
    let (client, _) = client_with(&transport);
    let mut client = client.poll_policy(Duration::from_secs(1), 5);

    let err = client.submit("two-sum", &request()).await.unwrap_err();
    assert!(matches!(err, JudgeError::PollTimeout { attempts: 5 }));

    // Bounded: exactly the submit plus the ceiling's worth of polls.
    assert_eq!(transport.request_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn sample_run_uses_the_interpret_endpoint() {
    let transport = ScriptedTransport::new(vec![
        (200, r#"{"interpret_id": "runcode_987654321"}"#),
        (
            200,
            r#"{"state": "SUCCESS", "status_msg": "Accepted", "status_runtime": "32 ms", "status_memory": "13.9 MB"}"#,
        ),
    ]);
    let (mut client, _) = client_with(&transport);

    let outcome = client
        .run_sample_tests("two-sum", &request(), "[2,7,11,15]\n9")
        .await
        .unwrap();
    assert!(outcome.is_accepted());

    let requests = transport.requests.lock().unwrap();
    assert!(requests[0].1.ends_with("/problems/two-sum/interpret_solution/"));
    assert!(requests[1].1.ends_with("/submissions/detail/runcode_987654321/check/"));
}

#[tokio::test(start_paused = true)]
async fn non_auth_http_failure_is_surfaced_raw() {
    let transport = ScriptedTransport::new(vec![(502, "bad gateway")]);
    let (mut client, _) = client_with(&transport);

    let err = client.submit("two-sum", &request()).await.unwrap_err();
    assert!(matches!(err, JudgeError::UnexpectedStatus { status: 502, .. }));
}

#[tokio::test(start_paused = true)]
async fn missing_submission_id_is_malformed() {
    let transport = ScriptedTransport::new(vec![(200, r#"{"unexpected": true}"#)]);
    let (mut client, _) = client_with(&transport);

    let err = client.submit("two-sum", &request()).await.unwrap_err();
    assert!(matches!(err, JudgeError::MalformedResponse { .. }));
}

#[tokio::test(start_paused = true)]
async fn fetch_problem_parses_the_graphql_payload() {
    let transport = ScriptedTransport::new(vec![(
        200,
        r#"{
            "data": {
                "question": {
                    "questionId": "1",
                    "title": "Two Sum",
                    "titleSlug": "two-sum",
                    "difficulty": "Easy",
                    "content": "<p>Given an array of integers...</p>",
                    "codeSnippets": [
                        {"lang": "C++", "langSlug": "cpp", "code": "class Solution {};"},
                        {"lang": "Python3", "langSlug": "python3", "code": "class Solution:\n    pass"}
                    ],
                    "sampleTestCase": "[2,7,11,15]\n9",
                    "exampleTestcases": "[2,7,11,15]\n9\n[3,2,4]\n6"
                }
            }
        }"#,
    )]);
    let (mut client, _) = client_with(&transport);

    let problem = client.fetch_problem("two-sum", "python3").await.unwrap();
    assert_eq!(problem.id, 1);
    assert_eq!(problem.title, "Two Sum");
    assert_eq!(problem.difficulty, "Easy");
    assert!(problem.code_template.starts_with("class Solution:"));
    assert_eq!(problem.sample_test_cases.len(), 1);
    assert_eq!(problem.sample_test_cases[0].input, "[2,7,11,15]\n9\n[3,2,4]\n6");
}

#[tokio::test(start_paused = true)]
async fn fetch_unknown_problem() {
    let transport = ScriptedTransport::new(vec![(200, r#"{"data": {"question": null}}"#)]);
    let (mut client, _) = client_with(&transport);

    let err = client
        .fetch_problem("nonexistent-problem", "python3")
        .await
        .unwrap_err();
    assert!(matches!(err, JudgeError::ProblemNotFound(slug) if slug == "nonexistent-problem"));
}
