//! Tests for FileStagingStore

use shared::{SandboxId, StormId, WindThreshold, FORECAST_AID};
use tempfile::TempDir;

use super::common::keyed;
use crate::error::ForecastError;
use crate::services::staging::FileStagingStore;
use crate::traits::StagingStore;

fn storm() -> StormId {
    StormId::new("al092024")
}

#[tokio::test]
async fn test_upsert_allocates_and_reuses_sandbox() {
    let temp = TempDir::new().unwrap();
    let store = FileStagingStore::new(temp.path());

    let first = store
        .upsert(&storm(), None, vec![keyed(FORECAST_AID, 12, WindThreshold::Kt34, 50)])
        .await
        .unwrap();
    assert_eq!(first, SandboxId(1));

    let again = store
        .upsert(&storm(), Some(first), vec![keyed(FORECAST_AID, 12, WindThreshold::Kt34, 60)])
        .await
        .unwrap();
    assert_eq!(again, first);
    assert!(temp.path().join("sandboxes").join("1.json").exists());

    // Nothing is published before check-in
    assert!(store.load_forecast(&storm()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checkin_publishes_upserts_and_deletions() {
    let temp = TempDir::new().unwrap();
    let store = FileStagingStore::new(temp.path());

    let sandbox = store
        .upsert(
            &storm(),
            None,
            vec![
                keyed(FORECAST_AID, 12, WindThreshold::Kt34, 70),
                keyed(FORECAST_AID, 12, WindThreshold::Kt50, 70),
            ],
        )
        .await
        .unwrap();
    store.checkin(sandbox).await.unwrap();
    assert_eq!(store.load_forecast(&storm()).await.unwrap().len(), 2);
    assert!(!temp.path().join("sandboxes").join("1.json").exists());

    let sandbox = store
        .upsert(&storm(), None, vec![keyed(FORECAST_AID, 12, WindThreshold::Kt34, 45)])
        .await
        .unwrap();
    store
        .delete(vec![keyed(FORECAST_AID, 12, WindThreshold::Kt50, 70)], sandbox)
        .await
        .unwrap();
    store.checkin(sandbox).await.unwrap();

    let published = store.load_forecast(&storm()).await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].key.threshold, WindThreshold::Kt34);
    assert_eq!(published[0].record.max_wind, 45);
}

#[tokio::test]
async fn test_unknown_sandbox_is_a_persistence_error() {
    let temp = TempDir::new().unwrap();
    let store = FileStagingStore::new(temp.path());

    let result = store.checkin(SandboxId(42)).await;
    assert!(matches!(result, Err(ForecastError::Persistence { .. })));

    let result = store
        .upsert(&storm(), Some(SandboxId(42)), vec![keyed(FORECAST_AID, 12, WindThreshold::Kt34, 50)])
        .await;
    assert!(matches!(result, Err(ForecastError::Persistence { .. })));
}
