//! File-backed deck store for objective aid and best-track records
//!
//! Layout under the base directory:
//! - `<STORM>/a-deck.json`, `b-deck.json`, `f-deck.json`: checked-in decks
//! - `sandboxes/<id>.json`: tagged edits awaiting check-in
//!
//! Queries see the checked-in deck with open sandbox edits laid over it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use shared::{
    storm_debug, CycleTime, DeckType, EditType, ForecastRecord, KeyedRecord, ModifiedRecord, RecordKey, SandboxId,
    StormId,
};

use crate::error::ForecastResult;
use crate::services::json_dir::JsonDir;
use crate::traits::AidStore;

#[derive(Debug, Serialize, Deserialize)]
struct DeckSandbox {
    storm: StormId,
    deck: DeckType,
    edits: Vec<ModifiedRecord>,
}

fn apply_edits(records: &mut BTreeMap<RecordKey, ForecastRecord>, edits: &[ModifiedRecord]) {
    for edit in edits {
        match edit.edit_type {
            EditType::New | EditType::Modify => {
                records.insert(edit.record.key.clone(), edit.record.record.clone());
            }
            EditType::Delete => {
                records.remove(&edit.record.key);
            }
        }
    }
}

/// Deck store keeping every document as JSON on disk
pub struct FileAidStore {
    dir: JsonDir,
}

impl FileAidStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: JsonDir::new(base_dir),
        }
    }

    fn deck_path(&self, storm: &StormId, deck: DeckType) -> PathBuf {
        let file = match deck {
            DeckType::A => "a-deck.json",
            DeckType::B => "b-deck.json",
            DeckType::F => "f-deck.json",
        };
        self.dir.path(storm.as_str()).join(file)
    }

    async fn load_deck(&self, storm: &StormId, deck: DeckType) -> ForecastResult<BTreeMap<RecordKey, ForecastRecord>> {
        let records: Vec<KeyedRecord> = self.dir.read(&self.deck_path(storm, deck)).await?.unwrap_or_default();
        Ok(records.into_iter().map(|r| (r.key, r.record)).collect())
    }

    async fn save_deck(
        &self,
        storm: &StormId,
        deck: DeckType,
        records: BTreeMap<RecordKey, ForecastRecord>,
    ) -> ForecastResult<()> {
        let records: Vec<KeyedRecord> = records
            .into_iter()
            .map(|(key, record)| KeyedRecord::new(key, record))
            .collect();
        self.dir.write(&self.deck_path(storm, deck), &records).await
    }

    /// Best-track records of a storm
    pub async fn best_track(&self, storm: &StormId) -> ForecastResult<Vec<KeyedRecord>> {
        Ok(self
            .load_deck(storm, DeckType::B)
            .await?
            .into_iter()
            .map(|(key, record)| KeyedRecord::new(key, record))
            .collect())
    }
}

#[async_trait]
impl AidStore for FileAidStore {
    async fn query(&self, storm: &StormId, cycles: Vec<CycleTime>) -> ForecastResult<Vec<KeyedRecord>> {
        let mut records = self.load_deck(storm, DeckType::A).await?;
        for sandbox in self.dir.sandbox_ids().await? {
            let staged: DeckSandbox = self.dir.read_sandbox(sandbox).await?;
            if staged.storm == *storm && staged.deck == DeckType::A {
                apply_edits(&mut records, &staged.edits);
            }
        }

        Ok(records
            .into_iter()
            .filter(|(key, _)| cycles.is_empty() || cycles.contains(&key.cycle))
            .map(|(key, record)| KeyedRecord::new(key, record))
            .collect())
    }

    async fn open_sandbox(&self, storm: &StormId, deck: DeckType) -> ForecastResult<SandboxId> {
        let sandbox = self.dir.next_sandbox_id().await?;
        let staged = DeckSandbox {
            storm: storm.clone(),
            deck,
            edits: Vec::new(),
        };
        self.dir.write(&self.dir.sandbox_path(sandbox), &staged).await?;
        storm_debug!(storm, "📁 Opened {}-deck {}", deck, sandbox);
        Ok(sandbox)
    }

    async fn batch_update(
        &self,
        sandbox: SandboxId,
        deck: DeckType,
        records: Vec<ModifiedRecord>,
    ) -> ForecastResult<bool> {
        let path = self.dir.sandbox_path(sandbox);
        let Some(mut staged) = self.dir.read::<DeckSandbox>(&path).await? else {
            return Ok(false);
        };
        if staged.deck != deck {
            return Ok(false);
        }
        staged.edits.extend(records);
        self.dir.write(&path, &staged).await?;
        Ok(true)
    }

    async fn checkin(&self, sandbox: SandboxId) -> ForecastResult<()> {
        let staged: DeckSandbox = self.dir.read_sandbox(sandbox).await?;
        let mut records = self.load_deck(&staged.storm, staged.deck).await?;
        apply_edits(&mut records, &staged.edits);
        self.save_deck(&staged.storm, staged.deck, records).await?;
        self.dir.remove(&self.dir.sandbox_path(sandbox)).await?;
        storm_debug!(staged.storm, "📁 Checked in {}-deck {}", staged.deck, sandbox);
        Ok(())
    }
}
