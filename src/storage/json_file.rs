//! # JSON File Store
//!
//! Keeps every key in a single JSON object on disk. The file is read once at
//! open and rewritten in full on each `set` (temp file + rename), so a crash
//! mid-write leaves the previous contents intact.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use super::KeyValueStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing, unreadable or garbled file starts
    /// empty; only a permission error is reported.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(values) => {
                    debug!("Loaded {} keys from {}", values.len(), path.display());
                    values
                }
                Err(e) => {
                    warn!(
                        "Ignoring unreadable store file {}: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(anyhow!("Failed to read {}: {}", path.display(), e));
            }
            Err(e) => {
                warn!("Ignoring unreadable store file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        let previous = values.insert(key.to_string(), value.to_string());

        if let Err(e) = self.write_file(&values).await {
            // Keep memory consistent with what is on disk
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(anyhow!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ));
        }

        debug!("Stored key '{}' in {}", key, self.path.display());
        Ok(())
    }
}
