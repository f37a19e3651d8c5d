//! # lc
//!
//! Solve LeetCode problems from the terminal, authenticating with the
//! session you already have in Chrome.
//!
//! The crate has two load-bearing subsystems:
//!
//! - [`cookies`] + [`session`] — credential acquisition: locate Chrome's
//!   encrypted cookie database, derive the `os_crypt` AES key (keyring
//!   password or the documented `"peanuts"` fallback), decrypt the
//!   `LEETCODE_SESSION` and `csrftoken` cookies, and cache the resulting
//!   session with explicit invalidation on auth failure.
//! - [`judge`] — submission lifecycle: submit code or run sample tests,
//!   poll the check endpoint at a fixed cadence under a wall-clock ceiling,
//!   and classify the judge's raw status vocabulary into a closed
//!   [`model::PollOutcome`] set.
//!
//! Everything else ([`storage`], [`cli`]) is plain local file and text
//! handling around those two.
//!
//! ## Security notes
//!
//! The cookie database is only ever opened read-only, through a throwaway
//! snapshot copy, and closed as soon as the rows are read. Derived keys and
//! decrypted tokens live in process memory only; keys are zeroized on drop
//! and redacted from all `Debug` output.

pub mod cli;
pub mod cookies;
pub mod error;
pub mod judge;
pub mod model;
pub mod session;
pub mod storage;

pub use error::{AuthError, DecryptError, JudgeError, StoreError, TransportError};
pub use judge::SubmissionClient;
pub use model::{PollOutcome, Problem, SubmissionHandle, SubmissionRequest};
pub use session::{ChromeCookieSource, CookieSource, Session, SessionManager};
pub use storage::Storage;
