//! Shared fixtures: Chrome-style encrypted rows, scripted cookie sources,
//! and a scripted HTTP transport.

#![allow(dead_code)]

use async_trait::async_trait;
use lc::cookies::chromedb::encryption::{AES_CBC_IV, V10_PREFIX};
use lc::cookies::store::EncryptedCookie;
use lc::cookies::DerivedKey;
use lc::error::{StoreError, TransportError};
use lc::judge::transport::{HttpResponse, Transport};
use lc::session::CookieSource;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Encrypt a plaintext the way Chrome v10 does: AES-128-CBC, all-space IV,
/// PKCS#7 padding, `v10` prefix.
pub fn encrypt_v10(plaintext: &str, key: &DerivedKey) -> Vec<u8> {
    use boring::symm::{encrypt, Cipher};

    let ciphertext = encrypt(
        Cipher::aes_128_cbc(),
        key.as_bytes(),
        Some(&AES_CBC_IV),
        plaintext.as_bytes(),
    )
    .unwrap();

    let mut value = V10_PREFIX.to_vec();
    value.extend_from_slice(&ciphertext);
    value
}

pub fn encrypted_row(name: &str, plaintext: &str, key: &DerivedKey) -> EncryptedCookie {
    EncryptedCookie {
        host_key: ".leetcode.com".to_string(),
        name: name.to_string(),
        plain_value: String::new(),
        encrypted_value: encrypt_v10(plaintext, key),
    }
}

/// Cookie source returning a fixed set of rows, counting reads.
pub struct StaticSource {
    rows: Vec<EncryptedCookie>,
    pub reads: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(rows: Vec<EncryptedCookie>) -> Self {
        Self {
            rows,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn read_count(reads: &Arc<AtomicUsize>) -> usize {
        reads.load(Ordering::SeqCst)
    }
}

impl CookieSource for StaticSource {
    fn read_cookies(
        &self,
        host_key: &str,
        names: &[&str],
    ) -> Result<Vec<EncryptedCookie>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .iter()
            .filter(|row| row.host_key == host_key && names.contains(&row.name.as_str()))
            .cloned()
            .collect())
    }
}

/// Cookie source yielding a different prepared row set on each read.
pub struct SequencedSource {
    batches: Mutex<VecDeque<Vec<EncryptedCookie>>>,
    pub reads: Arc<AtomicUsize>,
}

impl SequencedSource {
    pub fn new(batches: Vec<Vec<EncryptedCookie>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CookieSource for SequencedSource {
    fn read_cookies(
        &self,
        _host_key: &str,
        _names: &[&str],
    ) -> Result<Vec<EncryptedCookie>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut batches = self.batches.lock().unwrap();
        Ok(batches.pop_front().expect("source exhausted"))
    }
}

/// Transport that replays a scripted sequence of responses and records the
/// requests it saw. Clones share the script, so tests can keep a handle
/// after handing the transport to the client.
#[derive(Clone)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<(u16, &str)>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| HttpResponse {
                        status,
                        body: body.to_string(),
                    })
                    .collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next(&self, method: &str, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), url.to_string()));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted"))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        self.next("GET", url)
    }

    async fn post_json(
        &self,
        url: &str,
        _headers: &[(String, String)],
        _body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.next("POST", url)
    }
}
