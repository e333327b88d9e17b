//! # Storage
//!
//! Durable string-keyed persistence. Get/set/contains only, no transactions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;

/// Key holding the serialized reminder set
pub const REMINDERS_KEY: &str = "reminders";

/// Key holding the intake log date list
pub const INTAKE_LOG_KEY: &str = "creatine_log";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
