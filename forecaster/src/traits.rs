//! Trait definitions with mockall annotations for testing
//!
//! Collaborators the edit session and the aid reconciler talk to. Remote
//! stores are async; site configuration is read once at startup.

use shared::{CycleTime, DeckType, KeyedRecord, ModifiedRecord, SandboxId, SiteLimits, StormId};

use crate::error::ForecastResult;

/// Staging area for the primary forecast records
///
/// Records are upserted into a sandbox which is later checked in to make
/// them visible to other users.
#[mockall::automock]
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    /// Upsert records into a sandbox
    ///
    /// # Parameters
    /// - `storm`: Storm the records belong to
    /// - `sandbox`: Sandbox from an earlier commit, or `None` to open one
    /// - `records`: Records sorted by lead time then threshold
    ///
    /// # Returns
    /// The sandbox now holding the records
    async fn upsert(
        &self,
        storm: &StormId,
        sandbox: Option<SandboxId>,
        records: Vec<KeyedRecord>,
    ) -> ForecastResult<SandboxId>;

    /// Delete records from a sandbox
    async fn delete(&self, records: Vec<KeyedRecord>, sandbox: SandboxId) -> ForecastResult<()>;

    /// Check in a sandbox, publishing its contents
    async fn checkin(&self, sandbox: SandboxId) -> ForecastResult<()>;
}

/// Store of secondary (objective aid deck) records
#[mockall::automock]
#[async_trait::async_trait]
pub trait AidStore: Send + Sync {
    /// Query the aid records of a storm for the given cycles
    async fn query(&self, storm: &StormId, cycles: Vec<CycleTime>) -> ForecastResult<Vec<KeyedRecord>>;

    /// Open a sandbox for editing one deck of a storm
    async fn open_sandbox(&self, storm: &StormId, deck: DeckType) -> ForecastResult<SandboxId>;

    /// Apply a batch of tagged edits
    ///
    /// # Returns
    /// `true` when the remote store accepted the whole batch
    async fn batch_update(
        &self,
        sandbox: SandboxId,
        deck: DeckType,
        records: Vec<ModifiedRecord>,
    ) -> ForecastResult<bool>;

    /// Check in a sandbox
    async fn checkin(&self, sandbox: SandboxId) -> ForecastResult<()>;
}

/// Source of site forecast preferences
#[mockall::automock]
pub trait SiteConfigSource: Send + Sync {
    fn site_limits(&self) -> ForecastResult<SiteLimits>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CycleTime, ForecastRecord, RecordKey, WindThreshold, OFFICIAL_AID};

    #[tokio::test]
    async fn test_mock_staging_store() {
        let mut mock = MockStagingStore::new();
        mock.expect_upsert()
            .withf(|_, sandbox, records| sandbox.is_none() && records.len() == 1)
            .times(1)
            .returning(|_, _, _| Ok(SandboxId(7)));

        let cycle = CycleTime::from_dtg("2024091012").unwrap();
        let record = KeyedRecord::new(
            RecordKey::new(OFFICIAL_AID, cycle, 12, WindThreshold::Kt34),
            ForecastRecord::default(),
        );

        let sandbox = mock.upsert(&StormId::new("al092024"), None, vec![record]).await.unwrap();
        assert_eq!(sandbox, SandboxId(7));
    }

    #[test]
    fn test_mock_site_config() {
        let mut mock = MockSiteConfigSource::new();
        mock.expect_site_limits().returning(|| Ok(SiteLimits::default()));

        let limits = mock.site_limits().unwrap();
        assert_eq!(limits.forecast_horizon, 120);
    }
}
