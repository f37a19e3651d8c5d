//! Error types, one enum per subsystem.
//!
//! Failures compose upward: a cookie-store failure becomes an
//! [`AuthError`], which becomes a [`JudgeError`] once a judge operation is
//! in flight. Decryption failures never escape acquisition; they only steer
//! it to the next candidate key.

use std::path::PathBuf;
use thiserror::Error;

/// Reading the Chrome cookie database failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cookie database not found at {0}")]
    NotFound(PathBuf),

    /// The browser holds the database open with an exclusive lock.
    #[error("cookie database is locked by a running browser")]
    Locked,

    #[error("cookie database unreadable: {message}")]
    Unreadable { message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match &e {
            rusqlite::Error::SqliteFailure(inner, _)
                if matches!(
                    inner.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Locked
            }
            _ => StoreError::Unreadable {
                message: e.to_string(),
            },
        }
    }
}

/// A single cookie value failed to decrypt. Per-row and recoverable: the
/// caller moves on to the next candidate row or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// Wrong key, truncated ciphertext, or a block that does not end in
    /// valid PKCS#7 padding.
    #[error("ciphertext did not decrypt to valid padded plaintext")]
    PaddingInvalid,

    #[error("cookie has no value")]
    EmptyValue,
}

/// Credential acquisition failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No (row, key) pair produced a plausible session token. Usually means
    /// no logged-in browser session exists.
    #[error("no usable session cookie found; log in to leetcode.com in Chrome")]
    NoCredentialFound,

    /// The server rejected a freshly re-acquired session.
    #[error("session rejected by the server even after re-acquisition; log in again in Chrome")]
    SessionExpired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The HTTP layer failed before a status code was available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// A judge operation failed.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected HTTP {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    #[error("no such problem: {0}")]
    ProblemNotFound(String),

    /// The judge never reached a terminal state within the poll ceiling.
    /// Distinct from every verdict; the submission may still be running.
    #[error("judge did not finish within {attempts} polls")]
    PollTimeout { attempts: u32 },
}

/// Local problem storage failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("problem {0} is not saved locally; fetch it first")]
    ProblemNotFound(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bad metadata at {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },
}
