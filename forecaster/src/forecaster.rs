//! Coordinator tying an edit session to the official aid reconciler

use std::collections::BTreeMap;

use shared::{storm_warn, ForecastRecord, RecordKey, SandboxId};

use crate::core::ConsistencyEngine;
use crate::error::ForecastResult;
use crate::reconciler::ExternalAidReconciler;
use crate::session::EditSession;
use crate::traits::{AidStore, StagingStore};

/// Result of a save
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub sandbox: SandboxId,
    pub reconciled: usize,
}

/// One forecaster's edit of a storm
pub struct Forecaster<S, A>
where
    S: StagingStore,
    A: AidStore,
{
    session: EditSession<S>,
    reconciler: ExternalAidReconciler<A>,
}

impl<S, A> Forecaster<S, A>
where
    S: StagingStore,
    A: AidStore,
{
    pub fn new(session: EditSession<S>, reconciler: ExternalAidReconciler<A>) -> Self {
        Self { session, reconciler }
    }

    pub fn session(&self) -> &EditSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession<S> {
        &mut self.session
    }

    pub fn reconciler(&self) -> &ExternalAidReconciler<A> {
        &self.reconciler
    }

    pub fn engine(&mut self) -> ConsistencyEngine<'_> {
        self.session.engine()
    }

    fn warn_incomplete(&self) {
        for report in self.session.completeness_reports() {
            storm_warn!(self.session.storm(), "{}", report.message());
        }
    }

    /// Commit the session and mirror it into the official aid
    pub async fn save(&mut self) -> ForecastResult<SaveOutcome> {
        self.warn_incomplete();
        let sandbox = self.session.commit().await?;
        let reconciled = self
            .reconciler
            .reconcile(self.session.originals(), self.session.aspect())
            .await?;
        Ok(SaveOutcome { sandbox, reconciled })
    }

    /// Save, then check in both the forecast and the official aid sandboxes
    ///
    /// Nothing is checked in unless the official aid was reconciled first.
    pub async fn submit(&mut self) -> ForecastResult<()> {
        self.save().await?;
        self.session.checkin().await?;
        self.reconciler.submit().await
    }

    pub fn discard(self) -> BTreeMap<RecordKey, ForecastRecord> {
        self.session.discard()
    }
}
