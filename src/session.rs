//! Session acquisition and lifecycle.
//!
//! [`SessionManager`] owns the only mutable session state in the crate. It
//! resolves a session from the cookie store lazily, caches it for the
//! process, and is told about auth-class HTTP statuses so callers can
//! invalidate and re-acquire exactly once per logical operation.

use crate::cookies::store::EncryptedCookie;
use crate::cookies::{self, DerivedKey};
use crate::error::{AuthError, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Host the session cookies are scoped to.
pub const COOKIE_DOMAIN: &str = ".leetcode.com";
/// Session token cookie name.
pub const SESSION_COOKIE: &str = "LEETCODE_SESSION";
/// Anti-forgery token cookie name.
pub const CSRF_COOKIE: &str = "csrftoken";

/// An authenticated session: the session token plus the anti-forgery token
/// that must accompany every state-changing request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub csrf_token: String,
    #[serde(with = "time::serde::timestamp")]
    pub acquired_at: OffsetDateTime,
    /// Cleared by [`SessionManager::invalidate`]; a session is never handed
    /// out with this false.
    #[serde(skip, default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

// Token values are credentials; keep them out of Debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .field("acquired_at", &self.acquired_at)
            .field("valid", &self.valid)
            .finish()
    }
}

/// Source of encrypted cookie rows. The production implementation reads
/// Chrome's database; tests substitute scripted stores.
pub trait CookieSource {
    fn read_cookies(
        &self,
        host_key: &str,
        names: &[&str],
    ) -> Result<Vec<EncryptedCookie>, StoreError>;
}

/// Reads the cookie database of one Chrome profile.
pub struct ChromeCookieSource {
    db_path: PathBuf,
}

impl ChromeCookieSource {
    pub fn new(profile: &str) -> Self {
        Self {
            db_path: cookies::chromedb::cookie_db_path(profile),
        }
    }

    /// Point at an explicit database file instead of the profile layout.
    pub fn at_path(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl CookieSource for ChromeCookieSource {
    fn read_cookies(
        &self,
        host_key: &str,
        names: &[&str],
    ) -> Result<Vec<EncryptedCookie>, StoreError> {
        cookies::read_cookies(&self.db_path, host_key, names)
    }
}

/// Resolves, caches, and invalidates the authenticated session.
///
/// States: no session → cached (valid) → expired (after `invalidate`), with
/// re-acquisition transitioning back to cached. Transitions are sequential;
/// there is one submission flow per invocation and no shared mutation.
pub struct SessionManager<S = ChromeCookieSource> {
    source: S,
    keys: Vec<DerivedKey>,
    cached: Option<Session>,
    /// On-disk hint; never authoritative. `None` disables persistence.
    cache_path: Option<PathBuf>,
    hint_checked: bool,
}

impl SessionManager<ChromeCookieSource> {
    /// Manager for the given Chrome profile, with key candidates from the
    /// keyring (or fallback) and the default on-disk hint location.
    pub fn new(profile: &str, cache_path: Option<PathBuf>) -> Self {
        Self::with_parts(
            ChromeCookieSource::new(profile),
            cookies::key_candidates(),
            cache_path,
        )
    }
}

impl<S: CookieSource> SessionManager<S> {
    /// Assemble a manager from explicit parts. Used directly by tests.
    pub fn with_parts(source: S, keys: Vec<DerivedKey>, cache_path: Option<PathBuf>) -> Self {
        Self {
            source,
            keys,
            cached: None,
            cache_path,
            hint_checked: false,
        }
    }

    /// Return the cached session, or resolve a fresh one.
    ///
    /// Resolution order: in-memory cache (if still valid), on-disk hint (once
    /// per process, never after an invalidation), then a full acquisition
    /// pass over the cookie store.
    pub fn get_session(&mut self) -> Result<Session, AuthError> {
        if let Some(session) = &self.cached {
            if session.valid {
                return Ok(session.clone());
            }
        }

        if self.cached.is_none() && !self.hint_checked {
            self.hint_checked = true;
            if let Some(session) = self.load_hint() {
                tracing::debug!("session restored from on-disk hint");
                self.cached = Some(session.clone());
                return Ok(session);
            }
        }

        let session = self.acquire()?;
        self.store_hint(&session);
        self.cached = Some(session.clone());
        Ok(session)
    }

    /// Mark the current session expired and drop the on-disk hint.
    /// Idempotent; the next `get_session` re-acquires from the cookie store.
    pub fn invalidate(&mut self) {
        if let Some(session) = &mut self.cached {
            session.valid = false;
        }
        self.hint_checked = true;
        if let Some(path) = &self.cache_path {
            let _ = std::fs::remove_file(path);
        }
        tracing::debug!("session invalidated");
    }

    /// Whether an HTTP status means the session itself was rejected.
    pub fn on_response_status(&self, status: u16) -> bool {
        matches!(status, 401 | 403)
    }

    /// One acquisition pass: read both cookie rows and try every
    /// (row, key) pair independently. Succeeds as soon as each cookie name
    /// has produced one plausibly shaped plaintext.
    fn acquire(&mut self) -> Result<Session, AuthError> {
        let rows = self
            .source
            .read_cookies(COOKIE_DOMAIN, &[SESSION_COOKIE, CSRF_COOKIE])?;

        let mut token: Option<String> = None;
        let mut csrf: Option<String> = None;

        for row in &rows {
            let slot = match row.name.as_str() {
                SESSION_COOKIE => &mut token,
                CSRF_COOKIE => &mut csrf,
                _ => continue,
            };
            if slot.is_some() {
                continue;
            }
            for key in &self.keys {
                match cookies::decrypt(row, key) {
                    Ok(value) if plausible_token(&value) => {
                        *slot = Some(value);
                        break;
                    }
                    Ok(_) => {
                        tracing::debug!(cookie = %row.name, "decrypted value has implausible shape");
                    }
                    Err(e) => {
                        tracing::debug!(cookie = %row.name, error = %e, "candidate row failed to decrypt");
                    }
                }
            }
        }

        match (token, csrf) {
            (Some(token), Some(csrf_token)) => {
                tracing::debug!("session acquired from cookie store");
                Ok(Session {
                    token,
                    csrf_token,
                    acquired_at: OffsetDateTime::now_utc(),
                    valid: true,
                })
            }
            _ => Err(AuthError::NoCredentialFound),
        }
    }

    fn load_hint(&self) -> Option<Session> {
        let path = self.cache_path.as_ref()?;
        let data = std::fs::read_to_string(path).ok()?;
        let session: Session = serde_json::from_str(&data).ok()?;
        if plausible_token(&session.token) && plausible_token(&session.csrf_token) {
            Some(session)
        } else {
            None
        }
    }

    fn store_hint(&self, session: &Session) {
        let Some(path) = &self.cache_path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(session) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::debug!(error = %e, "failed to write session hint");
                }
            }
            Err(e) => tracing::debug!(error = %e, "failed to serialize session hint"),
        }
    }
}

/// Shape check for a decrypted token: non-empty printable ASCII with no
/// whitespace. Filters out garbage produced by stale or foreign rows.
fn plausible_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_graphic())
}
