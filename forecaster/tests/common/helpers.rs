//! Test helpers and builder patterns for forecaster tests
//!
//! Builders over the mocked collaborators and assertion helpers that keep
//! the scenario tests short.

use std::collections::BTreeMap;
use tokio::sync::mpsc;

use forecaster::traits::{MockAidStore, MockStagingStore};
use forecaster::{audit, ChangeEvent, EditSession, WindRadiiPolicy};
use shared::{ForecastAspect, ForecastRecord, RecordKey, SiteLimits, FORECAST_AID};

use super::fixtures::TestFixtures;

/// Builder for edit sessions over a mocked staging store
pub struct SessionBuilder {
    aspect: ForecastAspect,
    originals: BTreeMap<RecordKey, ForecastRecord>,
    limits: SiteLimits,
    staging: MockStagingStore,
}

impl SessionBuilder {
    /// Intensity session over the standard fixture forecast
    pub fn new() -> Self {
        Self {
            aspect: ForecastAspect::Intensity,
            originals: TestFixtures::forecast(),
            limits: SiteLimits::default(),
            staging: MockStagingStore::new(),
        }
    }

    pub fn with_aspect(mut self, aspect: ForecastAspect) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_originals(mut self, originals: BTreeMap<RecordKey, ForecastRecord>) -> Self {
        self.originals = originals;
        self
    }

    pub fn with_limits(mut self, limits: SiteLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configure the staging mock with a setup function
    pub fn with_staging<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockStagingStore),
    {
        setup(&mut self.staging);
        self
    }

    pub fn build(self) -> EditSession<MockStagingStore> {
        EditSession::begin(
            TestFixtures::storm(),
            self.aspect,
            FORECAST_AID,
            self.originals,
            self.staging,
            WindRadiiPolicy::new(self.limits),
        )
    }
}

/// Common assertion and plumbing helpers
pub struct TestHelpers;

impl TestHelpers {
    /// Every event currently queued on a subscription
    pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<ChangeEvent>) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Panic with every violation found in a record set
    pub fn assert_consistent(records: &BTreeMap<RecordKey, ForecastRecord>) {
        let violations = audit(records, FORECAST_AID);
        assert!(
            violations.is_empty(),
            "unexpected violations: {}",
            violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
        );
    }

    /// Aid store mock that holds no records and accepts every batch
    pub fn accepting_aid_store() -> MockAidStore {
        let mut aid_store = MockAidStore::new();
        aid_store.expect_query().returning(|_, _| Ok(Vec::new())).times(0..);
        aid_store
            .expect_open_sandbox()
            .returning(|_, _| Ok(shared::SandboxId(900)))
            .times(0..);
        aid_store.expect_batch_update().returning(|_, _, _| Ok(true)).times(0..);
        aid_store.expect_checkin().returning(|_| Ok(())).times(0..);
        aid_store
    }
}
