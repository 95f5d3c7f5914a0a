//! In-memory config store.
//!
//! Reference implementation of `ConfigStore`: a `BTreeMap` behind a
//! `parking_lot::RwLock`. Nothing survives the process. Use it for tests and
//! for embedding the service where persistence is handled elsewhere.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value as Json;
use tracing::info;

use super::{ConfigStore, SavedConfig, sanitize_name};
use crate::{Error, Result};

/// In-memory payload storage. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<BTreeMap<String, Json>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn save(&self, name: &str, payload: &Json) -> Result<SavedConfig> {
        let name = sanitize_name(name)?;
        self.inner.write().insert(name.clone(), payload.clone());
        info!(%name, "config saved (memory)");
        Ok(SavedConfig::new(name, Utc::now()))
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.inner.read().keys().cloned().collect())
    }

    async fn load(&self, name: &str) -> Result<Json> {
        let name = sanitize_name(name)?;
        self.inner
            .read()
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("config '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let payload = json!({"torqueInput": 10, "gears": []});

        let saved = store.save("train one", &payload).await.unwrap();
        assert_eq!(saved.name, "train_one");
        assert_eq!(saved.filename, "train_one.json");

        assert_eq!(store.load("train_one").await.unwrap(), payload);
        assert_eq!(store.load("train_one.json").await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let store = MemoryStore::new();
        store.save("b", &json!({})).await.unwrap();
        store.save("a", &json!({})).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.save("shared", &json!(1)).await.unwrap();
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn test_generated_name() {
        let store = MemoryStore::new();
        let saved = store.save_generated(&json!({})).await.unwrap();
        assert!(saved.name.starts_with("gearmatrix_"));
        assert!(!store.is_empty());
    }
}
