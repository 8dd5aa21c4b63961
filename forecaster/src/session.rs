//! Edit session over one forecast's records
//!
//! Edits happen on working copies. Applying changes copies back only the
//! fields owned by the session's aspect and folds in the pending cascade;
//! committing then pushes the full original set to the staging store.

use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;

use shared::{
    logging, storm_debug, storm_error, storm_info, storm_warn, ForecastAspect, ForecastRecord, KeyedRecord,
    RecordKey, SandboxId, SessionId, StormId,
};

use crate::core::{
    audit, ChangeEvent, CompletenessReport, ConsistencyEngine, PendingChanges, RecordStore, StoreSnapshot,
    WindRadiiPolicy,
};
use crate::error::ForecastResult;
use crate::traits::StagingStore;

/// An in-progress edit of one aspect of a storm's forecast
pub struct EditSession<S>
where
    S: StagingStore,
{
    id: SessionId,
    storm: StormId,
    aspect: ForecastAspect,
    primary_aid: String,
    staging: S,
    policy: WindRadiiPolicy,

    /// Records as last applied
    originals: BTreeMap<RecordKey, ForecastRecord>,

    /// Working copies the engine mutates
    working: RecordStore,

    /// Pairing between working copies and originals
    copy_to_original: HashMap<RecordKey, RecordKey>,
    original_to_copy: HashMap<RecordKey, RecordKey>,

    /// Working state at the last apply
    baseline: StoreSnapshot,

    pending: PendingChanges,

    /// Removed originals not yet deleted remotely
    pending_deletions: Vec<KeyedRecord>,

    sandbox: Option<SandboxId>,
}

impl<S> EditSession<S>
where
    S: StagingStore,
{
    /// Start a session by deep-copying the originals into working copies
    pub fn begin(
        storm: StormId,
        aspect: ForecastAspect,
        primary_aid: impl Into<String>,
        originals: BTreeMap<RecordKey, ForecastRecord>,
        staging: S,
        policy: WindRadiiPolicy,
    ) -> Self {
        let working = RecordStore::from_records(originals.clone());
        let pairs: Vec<RecordKey> = originals.keys().cloned().collect();
        let session = Self {
            id: SessionId::new(),
            storm,
            aspect,
            primary_aid: primary_aid.into(),
            staging,
            policy,
            baseline: working.snapshot(),
            copy_to_original: pairs.iter().map(|k| (k.clone(), k.clone())).collect(),
            original_to_copy: pairs.into_iter().map(|k| (k.clone(), k)).collect(),
            originals,
            working,
            pending: PendingChanges::default(),
            pending_deletions: Vec::new(),
            sandbox: None,
        };
        storm_debug!(
            session.storm,
            session = %session.id,
            aspect = %session.aspect,
            "Edit session started with {} records",
            session.originals.len()
        );
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn storm(&self) -> &StormId {
        &self.storm
    }

    pub fn aspect(&self) -> ForecastAspect {
        self.aspect
    }

    pub fn primary_aid(&self) -> &str {
        &self.primary_aid
    }

    pub fn policy(&self) -> &WindRadiiPolicy {
        &self.policy
    }

    pub fn sandbox(&self) -> Option<SandboxId> {
        self.sandbox
    }

    pub fn originals(&self) -> &BTreeMap<RecordKey, ForecastRecord> {
        &self.originals
    }

    pub fn working(&self) -> &RecordStore {
        &self.working
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn pending_deletions(&self) -> &[KeyedRecord] {
        &self.pending_deletions
    }

    /// Original paired with a working copy
    pub fn original_of(&self, copy: &RecordKey) -> Option<&ForecastRecord> {
        self.copy_to_original.get(copy).and_then(|key| self.originals.get(key))
    }

    /// Working copy paired with an original
    pub fn copy_of(&self, original: &RecordKey) -> Option<&ForecastRecord> {
        self.original_to_copy.get(original).and_then(|key| self.working.get(key))
    }

    /// Subscribe to changes of the working copies
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChangeEvent> {
        self.working.subscribe()
    }

    /// Edit operations over the working copies
    pub fn engine(&mut self) -> ConsistencyEngine<'_> {
        ConsistencyEngine::new(&mut self.working, &mut self.pending, &self.policy, self.aspect)
    }

    /// Whether the working copies differ from the last applied state
    pub fn has_unapplied_changes(&self) -> bool {
        !self.pending.is_empty() || !self.baseline.diff(&self.working.snapshot()).is_empty()
    }

    /// Completeness of the wind radii at every lead that may carry them
    pub fn completeness_reports(&self) -> Vec<CompletenessReport> {
        self.working
            .leads()
            .into_iter()
            .filter(|lead| self.policy.is_lead_time_editable(&self.working, *lead))
            .map(|lead| self.policy.validate_completeness(&self.working, lead))
            .filter(|report| !report.is_complete())
            .collect()
    }

    /// Fold working-copy edits and the pending cascade into the originals
    ///
    /// # Returns
    /// The keys added, removed and changed among the originals
    pub fn apply_changes(&mut self) -> ChangeEvent {
        let mut applied = ChangeEvent::default();
        let edited = self.baseline.diff(&self.working.snapshot());

        for key in edited.changed.iter().chain(edited.added.iter()) {
            let Some(copy) = self.working.get(key) else {
                continue;
            };
            let Some(original_key) = self.copy_to_original.get(key) else {
                continue;
            };
            if let Some(original) = self.originals.get_mut(original_key) {
                let before = original.clone();
                original.copy_aspect_from(copy, self.aspect);
                if *original != before {
                    applied.changed.insert(original_key.clone());
                }
            }
        }

        let pending = self.pending.take();

        for (key, fields) in pending.intensity_syncs() {
            if let Some(original) = self.originals.get_mut(key) {
                fields.apply_to(original);
                applied.changed.insert(key.clone());
            }
            if let Some(copy) = self.working.get(key) {
                let mut copy = copy.clone();
                fields.apply_to(&mut copy);
                self.working.put(key.clone(), copy);
            }
        }

        for (key, record) in pending.additions() {
            self.pending_deletions.retain(|deleted| deleted.key != *key);
            self.originals.insert(key.clone(), record.clone());
            self.working.put(key.clone(), record.clone());
            self.copy_to_original.insert(key.clone(), key.clone());
            self.original_to_copy.insert(key.clone(), key.clone());
            applied.changed.remove(key);
            applied.added.insert(key.clone());
        }

        for key in pending.removals() {
            if let Some(record) = self.originals.remove(key) {
                self.pending_deletions.push(KeyedRecord::new(key.clone(), record));
                applied.changed.remove(key);
                applied.removed.insert(key.clone());
            }
            self.working.remove(key);
            self.copy_to_original.remove(key);
            self.original_to_copy.remove(key);
        }

        self.baseline = self.working.snapshot();
        if !applied.is_empty() {
            storm_debug!(
                self.storm,
                session = %self.id,
                "Applied changes: {} added, {} removed, {} changed",
                applied.added.len(),
                applied.removed.len(),
                applied.changed.len()
            );
        }
        applied
    }

    /// Apply changes and stage the full record set
    ///
    /// On failure the session keeps its records, sandbox and pending
    /// deletions so the commit can be retried.
    pub async fn commit(&mut self) -> ForecastResult<SandboxId> {
        self.apply_changes();

        let violations = audit(&self.originals, &self.primary_aid);
        for violation in &violations {
            storm_warn!(self.storm, session = %self.id, "Committing inconsistent record: {}", violation);
        }

        let records: Vec<KeyedRecord> = self
            .originals
            .iter()
            .map(|(key, record)| KeyedRecord::new(key.clone(), record.clone()))
            .collect();
        let count = records.len();

        let sandbox = match self.staging.upsert(&self.storm, self.sandbox, records).await {
            Ok(sandbox) => sandbox,
            Err(e) => {
                storm_error!(self.storm, session = %self.id, "Upsert of {} records failed: {}", count, e);
                return Err(e);
            }
        };
        self.sandbox = Some(sandbox);

        if !self.pending_deletions.is_empty() {
            let deletions = self.pending_deletions.clone();
            if let Err(e) = self.staging.delete(deletions, sandbox).await {
                storm_error!(
                    self.storm,
                    session = %self.id,
                    "Deleting {} records failed: {}",
                    self.pending_deletions.len(),
                    e
                );
                return Err(e);
            }
            self.pending_deletions.clear();
        }

        storm_info!(self.storm, session = %self.id, "Committed {} records to {}", count, sandbox);
        Ok(sandbox)
    }

    /// Commit, then check in the sandbox
    pub async fn submit(&mut self) -> ForecastResult<()> {
        self.commit().await?;
        self.checkin().await
    }

    /// Check in the sandbox of the last commit, if any
    ///
    /// A failed check-in keeps the sandbox so it can be retried.
    pub async fn checkin(&mut self) -> ForecastResult<()> {
        let Some(sandbox) = self.sandbox else {
            return Ok(());
        };
        if let Err(e) = self.staging.checkin(sandbox).await {
            logging::log_error(&self.storm, "Sandbox check-in", &e);
            return Err(e);
        }
        self.sandbox = None;
        logging::log_success(&self.storm, &format!("{} forecast submitted", self.aspect));
        Ok(())
    }

    /// End the session without touching the remote store
    pub fn discard(self) -> BTreeMap<RecordKey, ForecastRecord> {
        storm_debug!(self.storm, session = %self.id, "Edit session discarded");
        self.originals
    }
}
