//! Test doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use inkpost_common::{AppError, AppResult, StorageBackend, StoredFile};

use super::email::{EmailMessage, Mailer};

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        if self.fail {
            return Err(AppError::ExternalService("connection refused".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// Storage backend over a `HashMap`.
#[derive(Default)]
pub struct MemoryStorage {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn with_file(key: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut files) = storage.files.lock() {
            files.insert(key.to_string(), vec![0]);
        }
        storage
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .files
            .lock()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(&self, key: &str, data: &[u8]) -> AppResult<StoredFile> {
        if let Ok(mut files) = self.files.lock() {
            files.insert(key.to_string(), data.to_vec());
        }
        Ok(StoredFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if let Ok(mut files) = self.files.lock() {
            files.remove(key);
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/media/{key}")
    }
}

/// Smallest valid PNG (1x1, transparent).
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Configuration with every optional section at its default.
pub fn test_config() -> inkpost_common::Config {
    inkpost_common::Config::from_toml_str(
        r#"
        [server]
        port = 3000

        [database]
        url = "postgres://localhost/inkpost_test"
        "#,
    )
    .unwrap_or_else(|e| panic!("test config: {e}"))
}
