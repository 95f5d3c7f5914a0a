//! # Config Store
//!
//! Persistence for raw request payloads, saved and loaded by name. The
//! calculation core never touches this; it exists so a client can keep a
//! gear train around between sessions.
//!
//! ## Implementations
//!
//! | Store         | Module   | Description                           |
//! |---------------|----------|---------------------------------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding       |
//! | `FileStore`   | `file`   | One `<name>.json` file per payload    |

pub mod memory;
pub mod file;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::StoreConfig;
use crate::{Error, Result};

pub use memory::MemoryStore;
pub use file::FileStore;

/// Prefix of generated names.
pub const NAME_PREFIX: &str = "gearmatrix";

/// Receipt for a saved payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfig {
    pub name: String,
    /// What the client sees: `<name>.json`.
    pub filename: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedConfig {
    pub fn new(name: String, saved_at: DateTime<Utc>) -> Self {
        let filename = format!("{name}.json");
        Self { name, filename, saved_at }
    }
}

/// Storage contract for saved request payloads.
///
/// Names passed in are untrusted; every implementation runs them through
/// [`sanitize_name`] before use.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Store `payload` under `name`, replacing any previous payload.
    async fn save(&self, name: &str, payload: &Json) -> Result<SavedConfig>;

    /// All saved names, sorted.
    async fn list(&self) -> Result<Vec<String>>;

    /// The payload saved under `name`. `NotFound` when there is none.
    async fn load(&self, name: &str) -> Result<Json>;

    /// Store `payload` under a fresh timestamped name.
    async fn save_generated(&self, payload: &Json) -> Result<SavedConfig> {
        self.save(&generated_name(Utc::now()), payload).await
    }
}

#[async_trait]
impl<S: ConfigStore + ?Sized> ConfigStore for Box<S> {
    async fn save(&self, name: &str, payload: &Json) -> Result<SavedConfig> {
        (**self).save(name, payload).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        (**self).list().await
    }

    async fn load(&self, name: &str) -> Result<Json> {
        (**self).load(name).await
    }

    async fn save_generated(&self, payload: &Json) -> Result<SavedConfig> {
        (**self).save_generated(payload).await
    }
}

/// Build a store from configuration.
pub async fn open(config: &StoreConfig) -> Result<Box<dyn ConfigStore>> {
    Ok(match config {
        StoreConfig::Memory => Box::new(MemoryStore::new()),
        StoreConfig::Directory { path } => Box::new(FileStore::open(path).await?),
    })
}

/// Keep `[A-Za-z0-9_-]`, replace everything else with `_`.
///
/// A trailing `.json` is dropped first so a listed filename can be fed back
/// in. Names that are empty or all underscores after that are rejected.
pub fn sanitize_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let stem = trimmed.strip_suffix(".json").unwrap_or(trimmed);
    let clean: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if clean.chars().all(|c| c == '_') {
        return Err(Error::ValidationError(format!("invalid config name '{raw}'")));
    }
    Ok(clean)
}

/// `gearmatrix_<UTC timestamp>`, e.g. `gearmatrix_20260101T120000Z`.
pub fn generated_name(at: DateTime<Utc>) -> String {
    format!("{NAME_PREFIX}_{}", at.format("%Y%m%dT%H%M%SZ"))
}
