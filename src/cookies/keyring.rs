//! Key derivation for Chrome's encrypted cookie values.
//!
//! Chrome derives its AES key with PBKDF2-HMAC-SHA1 from either the "Chrome
//! Safe Storage" password in the system keyring (v11) or the hardcoded
//! `"peanuts"` password (v10). A missing or locked keyring is not an error:
//! the fallback password is the documented default.

use crate::cookies::chromedb::encryption::{
    CHROME_SALT, KEY_LENGTH, LINUX_ITERATIONS, V10_PASSWORD,
};
use zeroize::Zeroize;

/// Derived AES-128 key. Held in memory only; zeroized on drop and redacted
/// from `Debug` output so it can never leak into logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LENGTH]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Derive the cookie decryption key from a keyring secret.
///
/// This matches Chromium's key derivation in `os_crypt` bit-for-bit: salt
/// `"saltysalt"`, 1 iteration, 16-byte output. Pure function of its input.
pub fn derive_key(secret: &[u8]) -> DerivedKey {
    use boring::hash::MessageDigest;
    use boring::pkcs5::pbkdf2_hmac;

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac(
        secret,
        CHROME_SALT,
        LINUX_ITERATIONS as usize,
        MessageDigest::sha1(),
        &mut key,
    )
    .expect("PBKDF2 should not fail");

    DerivedKey(key)
}

/// Key derived from the hardcoded v10 password.
pub fn fallback_key() -> DerivedKey {
    derive_key(V10_PASSWORD)
}

/// Every key worth trying against an encrypted row: the keyring-derived key
/// first (when a keyring secret exists), then the hardcoded fallback.
pub fn key_candidates() -> Vec<DerivedKey> {
    let mut keys = Vec::with_capacity(2);
    if let Some(secret) = safe_storage_secret() {
        keys.push(derive_key(&secret));
    }
    let fallback = fallback_key();
    if !keys.contains(&fallback) {
        keys.push(fallback);
    }
    keys
}

/// Fetch the "Chrome Safe Storage" password from the Secret Service.
///
/// Searches by the `application=chrome` attribute and prefers the item
/// labeled "Chrome Safe Storage" when several match (Chromium variants store
/// their passwords under the same attribute). Every failure mode (no bus,
/// locked collection, missing item) degrades to `None`; the caller falls
/// back to the v10 password.
#[cfg(target_os = "linux")]
fn safe_storage_secret() -> Option<zeroize::Zeroizing<Vec<u8>>> {
    use crate::cookies::chromedb::keyring::{APPLICATION, LABEL};
    use secret_service::blocking::SecretService;
    use secret_service::EncryptionType;
    use std::collections::HashMap;

    let ss = match SecretService::connect(EncryptionType::Dh) {
        Ok(ss) => ss,
        Err(e) => {
            tracing::debug!(error = %e, "Secret Service unavailable; using fallback password");
            return None;
        }
    };

    let mut attributes = HashMap::new();
    attributes.insert("application", APPLICATION);

    let search = ss.search_items(attributes).ok()?;
    let candidates: Vec<_> = search.unlocked.iter().chain(search.locked.iter()).collect();
    let item = candidates
        .iter()
        .copied()
        .find(|item| matches!(item.get_label(), Ok(label) if label == LABEL))
        .or_else(|| candidates.first().copied())?;

    if item.is_locked().unwrap_or(false) {
        item.unlock().ok()?;
    }

    let secret = item.get_secret().ok()?;
    tracing::debug!("Chrome Safe Storage password found in keyring");
    Some(zeroize::Zeroizing::new(secret))
}

#[cfg(not(target_os = "linux"))]
fn safe_storage_secret() -> Option<zeroize::Zeroizing<Vec<u8>>> {
    None
}
