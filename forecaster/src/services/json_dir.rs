//! JSON document directory shared by the file-backed stores

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use shared::SandboxId;

use crate::error::{ForecastError, ForecastResult};

const SANDBOX_DIR: &str = "sandboxes";

/// A base directory holding JSON documents and numbered sandbox files
#[derive(Clone, Debug)]
pub struct JsonDir {
    base_dir: PathBuf,
}

impl JsonDir {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn sandbox_path(&self, sandbox: SandboxId) -> PathBuf {
        self.base_dir.join(SANDBOX_DIR).join(format!("{}.json", sandbox.0))
    }

    /// Read a document, or `None` when the file does not exist
    pub async fn read<T: DeserializeOwned>(&self, path: &Path) -> ForecastResult<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a document through a temporary file so readers never see a partial one
    pub async fn write<T: Serialize>(&self, path: &Path, value: &T) -> ForecastResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub async fn remove(&self, path: &Path) -> ForecastResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of the sandbox files present, ascending
    pub async fn sandbox_ids(&self) -> ForecastResult<Vec<SandboxId>> {
        let dir = self.base_dir.join(SANDBOX_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse::<i64>().ok()) {
                ids.push(SandboxId(id));
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub async fn next_sandbox_id(&self) -> ForecastResult<SandboxId> {
        let last = self.sandbox_ids().await?.last().map(|id| id.0).unwrap_or(0);
        Ok(SandboxId(last + 1))
    }

    pub async fn read_sandbox<T: DeserializeOwned>(&self, sandbox: SandboxId) -> ForecastResult<T> {
        self.read(&self.sandbox_path(sandbox))
            .await?
            .ok_or_else(|| ForecastError::persistence("sandbox", format!("{sandbox} does not exist")))
    }
}
