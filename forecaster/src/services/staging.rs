//! File-backed staging store for forecast records
//!
//! Layout under the base directory:
//! - `<STORM>/forecast.json`: the checked-in forecast
//! - `sandboxes/<id>.json`: staged upserts and deletions awaiting check-in

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use shared::{storm_debug, ForecastRecord, KeyedRecord, RecordKey, SandboxId, StormId};

use crate::error::{ForecastError, ForecastResult};
use crate::services::json_dir::JsonDir;
use crate::traits::StagingStore;

#[derive(Debug, Serialize, Deserialize)]
struct StagedSandbox {
    storm: StormId,
    records: Vec<KeyedRecord>,
    deleted: Vec<RecordKey>,
}

/// Staging store keeping every document as JSON on disk
pub struct FileStagingStore {
    dir: JsonDir,
}

impl FileStagingStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: JsonDir::new(base_dir),
        }
    }

    fn forecast_path(&self, storm: &StormId) -> PathBuf {
        self.dir.path(storm.as_str()).join("forecast.json")
    }

    /// The checked-in forecast of a storm
    pub async fn load_forecast(&self, storm: &StormId) -> ForecastResult<Vec<KeyedRecord>> {
        Ok(self.dir.read(&self.forecast_path(storm)).await?.unwrap_or_default())
    }

    async fn save_sandbox(&self, sandbox: SandboxId, staged: &StagedSandbox) -> ForecastResult<()> {
        self.dir.write(&self.dir.sandbox_path(sandbox), staged).await
    }
}

#[async_trait]
impl StagingStore for FileStagingStore {
    async fn upsert(
        &self,
        storm: &StormId,
        sandbox: Option<SandboxId>,
        records: Vec<KeyedRecord>,
    ) -> ForecastResult<SandboxId> {
        let (sandbox, mut staged) = match sandbox {
            Some(sandbox) => {
                let staged: StagedSandbox = self.dir.read_sandbox(sandbox).await?;
                if staged.storm != *storm {
                    return Err(ForecastError::persistence(
                        "upsert",
                        format!("{sandbox} belongs to {}", staged.storm),
                    ));
                }
                (sandbox, staged)
            }
            None => (
                self.dir.next_sandbox_id().await?,
                StagedSandbox {
                    storm: storm.clone(),
                    records: Vec::new(),
                    deleted: Vec::new(),
                },
            ),
        };

        let mut merged: BTreeMap<RecordKey, ForecastRecord> =
            staged.records.drain(..).map(|r| (r.key, r.record)).collect();
        for record in records {
            staged.deleted.retain(|key| *key != record.key);
            merged.insert(record.key, record.record);
        }
        staged.records = merged.into_iter().map(|(key, record)| KeyedRecord::new(key, record)).collect();

        self.save_sandbox(sandbox, &staged).await?;
        storm_debug!(storm, "📁 Staged {} records in {}", staged.records.len(), sandbox);
        Ok(sandbox)
    }

    async fn delete(&self, records: Vec<KeyedRecord>, sandbox: SandboxId) -> ForecastResult<()> {
        let mut staged: StagedSandbox = self.dir.read_sandbox(sandbox).await?;
        for record in records {
            staged.records.retain(|r| r.key != record.key);
            if !staged.deleted.contains(&record.key) {
                staged.deleted.push(record.key);
            }
        }
        self.save_sandbox(sandbox, &staged).await
    }

    async fn checkin(&self, sandbox: SandboxId) -> ForecastResult<()> {
        let staged: StagedSandbox = self.dir.read_sandbox(sandbox).await?;

        let mut published: BTreeMap<RecordKey, ForecastRecord> = self
            .load_forecast(&staged.storm)
            .await?
            .into_iter()
            .map(|r| (r.key, r.record))
            .collect();
        for key in &staged.deleted {
            published.remove(key);
        }
        for record in staged.records {
            published.insert(record.key, record.record);
        }

        let published: Vec<KeyedRecord> = published
            .into_iter()
            .map(|(key, record)| KeyedRecord::new(key, record))
            .collect();
        self.dir.write(&self.forecast_path(&staged.storm), &published).await?;
        self.dir.remove(&self.dir.sandbox_path(sandbox)).await?;

        storm_debug!(staged.storm, "📁 Checked in {} with {} records", sandbox, published.len());
        Ok(())
    }
}
