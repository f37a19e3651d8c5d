//! Read-only access to the Chrome cookie SQLite database.
//!
//! The browser may hold the live database open (and locked) at any time, so
//! reads go through a throwaway snapshot copy. The connection is closed as
//! soon as the rows are drained; nothing here ever mutates the store.

use crate::cookies::chromedb::encryption::{V10_PREFIX, V11_PREFIX};
use crate::error::StoreError;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// One encrypted row from the `cookies` table. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedCookie {
    pub host_key: String,
    pub name: String,
    /// Plaintext `value` column. Populated only on very old rows that predate
    /// encryption; empty on every row written by a modern Chrome.
    pub plain_value: String,
    /// Raw `encrypted_value` column including the version prefix.
    pub encrypted_value: Vec<u8>,
}

impl EncryptedCookie {
    /// Encryption scheme version from the value prefix, if any.
    pub fn version(&self) -> Option<u8> {
        if self.encrypted_value.starts_with(V10_PREFIX) {
            Some(10)
        } else if self.encrypted_value.starts_with(V11_PREFIX) {
            Some(11)
        } else {
            None
        }
    }
}

/// Read the named cookies for one host from a Chrome cookie database.
///
/// Returns every matching row in whatever order SQLite yields them; zero
/// matches is success with an empty vec, distinct from the store being
/// missing or unreadable.
pub fn read_cookies(
    db_path: &Path,
    host_key: &str,
    names: &[&str],
) -> Result<Vec<EncryptedCookie>, StoreError> {
    if !db_path.exists() {
        return Err(StoreError::NotFound(db_path.to_path_buf()));
    }

    let snapshot = Snapshot::create(db_path)?;

    let conn = Connection::open_with_flags(
        snapshot.path(),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(StoreError::from)?;

    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!(
        "SELECT host_key, name, value, encrypted_value FROM cookies \
         WHERE host_key = ? AND name IN ({placeholders})"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params = std::iter::once(host_key).chain(names.iter().copied());
    let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
        Ok(EncryptedCookie {
            host_key: row.get(0)?,
            name: row.get(1)?,
            plain_value: row.get(2)?,
            encrypted_value: row.get(3)?,
        })
    })?;

    let mut cookies = Vec::new();
    for row in rows {
        cookies.push(row?);
    }

    tracing::debug!(host = %host_key, count = cookies.len(), "cookie store read complete");
    Ok(cookies)
}

/// Temp-file copy of the live database, deleted on drop.
///
/// Chrome keeps the database in WAL mode and holds it locked while running;
/// copying first keeps us a pure concurrent reader.
struct Snapshot {
    path: PathBuf,
}

/// Distinguishes snapshots taken by concurrent reads within one process.
static SNAPSHOT_SEQ: AtomicU64 = AtomicU64::new(0);

impl Snapshot {
    fn create(db_path: &Path) -> Result<Self, StoreError> {
        let seq = SNAPSHOT_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "lc-cookies-{}-{}.db",
            std::process::id(),
            seq
        ));
        std::fs::copy(db_path, &path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(db_path.to_path_buf()),
            _ => StoreError::Unreadable {
                message: e.to_string(),
            },
        })?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
