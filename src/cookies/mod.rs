//! Credential acquisition from Chrome's encrypted cookie store.
//!
//! The pipeline is: locate the profile's SQLite cookie database
//! ([`chromedb`]), read the encrypted rows for the target host ([`store`]),
//! derive the AES key from the keyring password or the documented fallback
//! ([`keyring`]), and decrypt each candidate row ([`decrypt`]). Each row is
//! evaluated independently; one undecryptable row never aborts the pass.

pub mod chromedb;
pub mod decrypt;
pub mod keyring;
pub mod store;

pub use decrypt::decrypt;
pub use keyring::{derive_key, fallback_key, key_candidates, DerivedKey};
pub use store::{read_cookies, EncryptedCookie};
