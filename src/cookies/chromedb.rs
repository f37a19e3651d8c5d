//! Chromium cookie encryption constants and store locations.
//!
//! These values exactly match Chromium's Linux implementation; any deviation
//! yields wrong plaintext rather than an error, so they must not be "fixed".
//!
//! ## Reference Files
//! - `components/os_crypt/sync/os_crypt_linux.cc`
//! - `components/os_crypt/sync/key_storage_libsecret.cc`
//! - `net/extras/sqlite/sqlite_persistent_cookie_store.cc`

use std::path::PathBuf;

/// Encryption version prefixes and key-derivation inputs.
pub mod encryption {
    /// Linux v10: key derived from the hardcoded password.
    pub const V10_PREFIX: &[u8] = b"v10";

    /// Linux v11: key derived from the GNOME Keyring password.
    pub const V11_PREFIX: &[u8] = b"v11";

    /// Default password when no keyring entry exists. Load-bearing: Chromium
    /// itself falls back to this string, so it must match verbatim.
    pub const V10_PASSWORD: &[u8] = b"peanuts";

    /// Salt used for all PBKDF2 key derivation.
    pub const CHROME_SALT: &[u8] = b"saltysalt";

    /// PBKDF2 iterations on Linux (deliberately low; Chromium's choice).
    pub const LINUX_ITERATIONS: u32 = 1;

    /// Derived AES key length in bytes.
    pub const KEY_LENGTH: usize = 16;

    /// AES-CBC IV: 16 space characters. Chromium never randomizes it.
    pub const AES_CBC_IV: [u8; 16] = [0x20; 16];
}

/// Keyring lookup attributes.
pub mod keyring {
    /// Secret Service attribute value Chromium stores its password under.
    pub const APPLICATION: &str = "chrome";

    /// Label of the keyring item.
    pub const LABEL: &str = "Chrome Safe Storage";
}

/// Path to a Chrome profile's cookie database.
///
/// Chrome 96+ keeps the database under `Network/Cookies`; older profiles had
/// it at the profile root. Returns the first path that exists, or the modern
/// one if neither does (so the not-found error names the expected location).
pub fn cookie_db_path(profile: &str) -> PathBuf {
    let base = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/google-chrome")
        .join(profile);

    let modern = base.join("Network/Cookies");
    if modern.exists() {
        return modern;
    }
    let legacy = base.join("Cookies");
    if legacy.exists() {
        return legacy;
    }
    modern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_constants() {
        assert_eq!(encryption::V10_PREFIX, b"v10");
        assert_eq!(encryption::V11_PREFIX, b"v11");
        assert_eq!(encryption::V10_PASSWORD, b"peanuts");
        assert_eq!(encryption::CHROME_SALT, b"saltysalt");
        assert_eq!(encryption::LINUX_ITERATIONS, 1);
        assert_eq!(encryption::KEY_LENGTH, 16);
        assert!(encryption::AES_CBC_IV.iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_keyring_constants() {
        assert_eq!(keyring::APPLICATION, "chrome");
        assert_eq!(keyring::LABEL, "Chrome Safe Storage");
    }

    #[test]
    fn test_cookie_db_path_shape() {
        let path = cookie_db_path("Default");
        let s = path.to_string_lossy();
        assert!(s.contains(".config/google-chrome/Default"));
        assert!(s.ends_with("Cookies"));
    }
}
