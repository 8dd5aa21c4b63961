//! Mirrors committed forecast records into the official aid's deck records

use std::collections::{BTreeMap, BTreeSet};

use shared::{
    storm_debug, storm_error, storm_info, CycleTime, DeckType, EditType, ForecastAspect, ForecastRecord, KeyedRecord,
    ModifiedRecord, RecordKey, SandboxId, StormId, OFFICIAL_AID,
};

use crate::error::{ForecastError, ForecastResult};
use crate::traits::AidStore;

/// Leads that carry 12 ft seas in the official aid
const SEAS_LEADS: [i32; 2] = [0, 3];

/// Keeps the official aid's secondary records in step with the forecast
pub struct ExternalAidReconciler<A>
where
    A: AidStore,
{
    aid_store: A,
    storm: StormId,
    official_aid: String,

    /// Official aid records as last read from the store
    cache: BTreeMap<RecordKey, ForecastRecord>,

    sandbox: Option<SandboxId>,
}

impl<A> ExternalAidReconciler<A>
where
    A: AidStore,
{
    pub fn new(aid_store: A, storm: StormId) -> Self {
        Self {
            aid_store,
            storm,
            official_aid: OFFICIAL_AID.to_string(),
            cache: BTreeMap::new(),
            sandbox: None,
        }
    }

    pub fn with_official_aid(mut self, aid: impl Into<String>) -> Self {
        self.official_aid = aid.into();
        self
    }

    pub fn official_aid(&self) -> &str {
        &self.official_aid
    }

    pub fn cached(&self) -> &BTreeMap<RecordKey, ForecastRecord> {
        &self.cache
    }

    pub fn sandbox(&self) -> Option<SandboxId> {
        self.sandbox
    }

    /// Reload the official aid records for the given cycles
    pub async fn refresh(&mut self, cycles: Vec<CycleTime>) -> ForecastResult<usize> {
        let records = self.aid_store.query(&self.storm, cycles).await?;
        self.cache = records
            .into_iter()
            .filter(|r| r.key.aid == self.official_aid)
            .map(|r| (r.key, r.record))
            .collect();
        Ok(self.cache.len())
    }

    /// Push the aspect-owned fields of committed records to the official aid
    ///
    /// # Returns
    /// Number of secondary records created or modified
    pub async fn reconcile(
        &mut self,
        committed: &BTreeMap<RecordKey, ForecastRecord>,
        aspect: ForecastAspect,
    ) -> ForecastResult<usize> {
        let cycles: Vec<CycleTime> = committed
            .keys()
            .map(|key| key.cycle)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if cycles.is_empty() {
            return Ok(0);
        }
        self.refresh(cycles.clone()).await?;

        let batch = self.build_batch(committed, aspect);
        if batch.is_empty() {
            storm_debug!(self.storm, "Official aid already matches the forecast");
            return Ok(0);
        }
        let count = batch.len();

        let sandbox = match self.sandbox {
            Some(sandbox) => sandbox,
            None => {
                let sandbox = self.aid_store.open_sandbox(&self.storm, DeckType::A).await?;
                self.sandbox = Some(sandbox);
                sandbox
            }
        };

        let accepted = self.aid_store.batch_update(sandbox, DeckType::A, batch).await?;
        if !accepted {
            storm_error!(self.storm, "Aid store rejected {} {} records", count, self.official_aid);
            return Err(ForecastError::persistence(
                "batch_update",
                format!("{count} {} records rejected", self.official_aid),
            ));
        }

        self.refresh(cycles).await?;
        storm_info!(self.storm, "Reconciled {} {} records", count, self.official_aid);
        Ok(count)
    }

    fn build_batch(&self, committed: &BTreeMap<RecordKey, ForecastRecord>, aspect: ForecastAspect) -> Vec<ModifiedRecord> {
        let mut batch = Vec::new();
        for (key, record) in committed {
            let secondary_key = key.with_aid(self.official_aid.clone());
            match self.cache.get(&secondary_key) {
                Some(existing) => {
                    if aspect == ForecastAspect::Seas && !SEAS_LEADS.contains(&key.lead_hours) {
                        continue;
                    }
                    let mut updated = existing.clone();
                    updated.copy_aspect_from(record, aspect);
                    if updated != *existing {
                        batch.push(ModifiedRecord {
                            edit_type: EditType::Modify,
                            record: KeyedRecord::new(secondary_key, updated),
                        });
                    }
                }
                None => batch.push(ModifiedRecord {
                    edit_type: EditType::New,
                    record: KeyedRecord::new(secondary_key, record.clone()),
                }),
            }
        }
        batch
    }

    /// Check in the secondary sandbox, if one is open
    pub async fn submit(&mut self) -> ForecastResult<()> {
        let Some(sandbox) = self.sandbox else {
            return Ok(());
        };
        self.aid_store.checkin(sandbox).await?;
        self.sandbox = None;
        storm_info!(self.storm, "Checked in {} {}", self.official_aid, sandbox);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockAidStore;
    use shared::{Radii, WindThreshold, FORECAST_AID};

    fn key(aid: &str, lead: i32) -> RecordKey {
        RecordKey::new(aid, CycleTime::from_dtg("2024091012").unwrap(), lead, WindThreshold::Kt34)
    }

    #[tokio::test]
    async fn test_seas_only_reconciled_at_early_leads() {
        let stale = ForecastRecord {
            wave_radii: Radii::circle(10),
            ..Default::default()
        };
        let secondary = vec![
            KeyedRecord::new(key(OFFICIAL_AID, 3), stale.clone()),
            KeyedRecord::new(key(OFFICIAL_AID, 12), stale.clone()),
        ];

        let mut aid_store = MockAidStore::new();
        aid_store.expect_query().returning(move |_, _| Ok(secondary.clone()));
        aid_store.expect_open_sandbox().times(1).returning(|_, _| Ok(SandboxId(3)));
        aid_store
            .expect_batch_update()
            .withf(|_, deck, records| {
                *deck == DeckType::A
                    && records.len() == 1
                    && records[0].record.key.lead_hours == 3
                    && records[0].edit_type == EditType::Modify
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let fresh = ForecastRecord {
            wave_radii: Radii::circle(120),
            ..Default::default()
        };
        let committed = BTreeMap::from([(key(FORECAST_AID, 3), fresh.clone()), (key(FORECAST_AID, 12), fresh)]);

        let mut reconciler = ExternalAidReconciler::new(aid_store, StormId::new("al092024"));
        let count = reconciler.reconcile(&committed, ForecastAspect::Seas).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(reconciler.sandbox(), Some(SandboxId(3)));
    }

    #[tokio::test]
    async fn test_rejected_batch_is_an_error() {
        let mut aid_store = MockAidStore::new();
        aid_store.expect_query().returning(|_, _| Ok(Vec::new()));
        aid_store.expect_open_sandbox().returning(|_, _| Ok(SandboxId(1)));
        aid_store.expect_batch_update().returning(|_, _, _| Ok(false));

        let committed = BTreeMap::from([(key(FORECAST_AID, 12), ForecastRecord::default())]);
        let mut reconciler = ExternalAidReconciler::new(aid_store, StormId::new("al092024"));

        let result = reconciler.reconcile(&committed, ForecastAspect::Track).await;
        assert!(matches!(result, Err(ForecastError::Persistence { .. })));
    }
}
