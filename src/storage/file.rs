//! Directory-backed config store: one pretty-printed `<name>.json` per payload.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as Json;
use tokio::fs;
use tracing::{debug, info};

use super::{ConfigStore, SavedConfig, sanitize_name};
use crate::{Error, Result};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn save(&self, name: &str, payload: &Json) -> Result<SavedConfig> {
        let name = sanitize_name(name)?;
        let path = self.path_for(&name);
        let body = serde_json::to_vec_pretty(payload)?;
        fs::write(&path, body).await?;
        info!(%name, path = %path.display(), "config saved");
        Ok(SavedConfig::new(name, Utc::now()))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Only names `load` can address again.
            if sanitize_name(stem).ok().as_deref() == Some(stem) {
                names.push(stem.to_string());
            } else {
                debug!(path = %path.display(), "skipping file with unloadable name");
            }
        }
        names.sort();
        Ok(names)
    }

    async fn load(&self, name: &str) -> Result<Json> {
        let name = sanitize_name(name)?;
        let bytes = match fs::read(self.path_for(&name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("config '{name}'")));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::StorageError(format!("config '{name}' is not valid JSON: {e}")))
    }
}
