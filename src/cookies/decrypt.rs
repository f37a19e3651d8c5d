//! Chrome os_crypt compatible cookie value decryption.
//!
//! Decrypts `v10`/`v11` values with AES-128-CBC, the fixed all-space IV, and
//! PKCS#7 padding. The IV is part of Chromium's format; there is no
//! randomness to reproduce. Based on Chromium's
//! `components/os_crypt/sync/os_crypt_posix.cc`.

use crate::cookies::chromedb::encryption::{AES_CBC_IV, KEY_LENGTH, V10_PREFIX};
use crate::cookies::keyring::DerivedKey;
use crate::cookies::store::EncryptedCookie;
use crate::error::DecryptError;

const AES_BLOCK: usize = 16;

/// Decrypt one cookie row with the given key.
///
/// A wrong key is an expected outcome, reported as
/// [`DecryptError::PaddingInvalid`] so the caller can try the next candidate.
/// This never panics and never returns a silently wrong plaintext: a bogus
/// key fails the padding or UTF-8 check instead.
pub fn decrypt(cookie: &EncryptedCookie, key: &DerivedKey) -> Result<String, DecryptError> {
    let data = &cookie.encrypted_value;

    if data.is_empty() {
        // Rows written before Chrome encrypted values keep the plaintext in
        // the `value` column.
        if cookie.plain_value.is_empty() {
            return Err(DecryptError::EmptyValue);
        }
        return Ok(cookie.plain_value.clone());
    }

    if cookie.version().is_none() {
        // Unprefixed encrypted_value: stored as plaintext bytes.
        return String::from_utf8(data.clone()).map_err(|_| DecryptError::PaddingInvalid);
    }

    let ciphertext = &data[V10_PREFIX.len()..];
    if ciphertext.is_empty() {
        return Err(DecryptError::EmptyValue);
    }
    if ciphertext.len() % AES_BLOCK != 0 {
        return Err(DecryptError::PaddingInvalid);
    }

    let plaintext = decrypt_aes_cbc(key.as_bytes(), &AES_CBC_IV, ciphertext)
        .ok_or(DecryptError::PaddingInvalid)?;

    String::from_utf8(plaintext).map_err(|_| DecryptError::PaddingInvalid)
}

/// AES-128-CBC decrypt with PKCS#7 padding verification.
fn decrypt_aes_cbc(key: &[u8; KEY_LENGTH], iv: &[u8; 16], data: &[u8]) -> Option<Vec<u8>> {
    use boring::symm::{Cipher, Crypter, Mode};

    let cipher = Cipher::aes_128_cbc();
    let mut crypter = Crypter::new(cipher, Mode::Decrypt, key, Some(iv)).ok()?;
    crypter.pad(true);

    let mut plaintext = vec![0u8; data.len() + AES_BLOCK];
    let count = crypter.update(data, &mut plaintext).ok()?;
    let rest = crypter.finalize(&mut plaintext[count..]).ok()?;
    plaintext.truncate(count + rest);

    Some(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::keyring::{derive_key, fallback_key};

    fn v10_row(plaintext: &[u8], key: &DerivedKey) -> EncryptedCookie {
        use boring::symm::{encrypt, Cipher};

        let ciphertext = encrypt(
            Cipher::aes_128_cbc(),
            key.as_bytes(),
            Some(&AES_CBC_IV),
            plaintext,
        )
        .unwrap();

        let mut value = V10_PREFIX.to_vec();
        value.extend_from_slice(&ciphertext);
        EncryptedCookie {
            host_key: ".leetcode.com".into(),
            name: "LEETCODE_SESSION".into(),
            plain_value: String::new(),
            encrypted_value: value,
        }
    }

    #[test]
    fn test_fixed_vector_round_trip() {
        // Known plaintext through the documented constants must come back
        // byte-identical.
        let key = fallback_key();
        let row = v10_row(b"session-token-value-0123456789", &key);
        assert_eq!(decrypt(&row, &key).unwrap(), "session-token-value-0123456789");
    }

    #[test]
    fn test_wrong_key_is_typed_error() {
        let row = v10_row(b"some cookie payload", &fallback_key());
        let wrong = derive_key(b"not-the-password");
        assert_eq!(decrypt(&row, &wrong), Err(DecryptError::PaddingInvalid));
    }

    #[test]
    fn test_empty_value() {
        let row = EncryptedCookie {
            host_key: ".leetcode.com".into(),
            name: "csrftoken".into(),
            plain_value: String::new(),
            encrypted_value: Vec::new(),
        };
        assert_eq!(decrypt(&row, &fallback_key()), Err(DecryptError::EmptyValue));
    }

    #[test]
    fn test_legacy_plaintext_column() {
        let row = EncryptedCookie {
            host_key: ".leetcode.com".into(),
            name: "csrftoken".into(),
            plain_value: "legacy-plain".into(),
            encrypted_value: Vec::new(),
        };
        assert_eq!(decrypt(&row, &fallback_key()).unwrap(), "legacy-plain");
    }

    #[test]
    fn test_unprefixed_value_is_plaintext() {
        let row = EncryptedCookie {
            host_key: ".leetcode.com".into(),
            name: "csrftoken".into(),
            plain_value: String::new(),
            encrypted_value: b"unencrypted-bytes".to_vec(),
        };
        assert_eq!(decrypt(&row, &fallback_key()).unwrap(), "unencrypted-bytes");
    }

    #[test]
    fn test_truncated_ciphertext() {
        let key = fallback_key();
        let mut row = v10_row(b"0123456789abcdef0123456789abcdef", &key);
        row.encrypted_value.truncate(V10_PREFIX.len() + 7);
        assert_eq!(decrypt(&row, &key), Err(DecryptError::PaddingInvalid));
    }

    #[test]
    fn test_prefix_only_value() {
        let key = fallback_key();
        let row = EncryptedCookie {
            host_key: ".leetcode.com".into(),
            name: "csrftoken".into(),
            plain_value: String::new(),
            encrypted_value: V10_PREFIX.to_vec(),
        };
        assert_eq!(decrypt(&row, &key), Err(DecryptError::EmptyValue));
    }
}
