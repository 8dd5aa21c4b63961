//! Tests for FileAidStore

use shared::{DeckType, EditType, ModifiedRecord, StormId, WindThreshold, OFFICIAL_AID};
use tempfile::TempDir;

use super::common::{cycle, keyed};
use crate::services::aid_store::FileAidStore;
use crate::traits::AidStore;

fn storm() -> StormId {
    StormId::new("al092024")
}

#[tokio::test]
async fn test_sandbox_edits_visible_to_query_and_published_on_checkin() {
    let temp = TempDir::new().unwrap();
    let store = FileAidStore::new(temp.path());

    assert!(store.query(&storm(), vec![cycle()]).await.unwrap().is_empty());

    let sandbox = store.open_sandbox(&storm(), DeckType::A).await.unwrap();
    let accepted = store
        .batch_update(
            sandbox,
            DeckType::A,
            vec![ModifiedRecord {
                edit_type: EditType::New,
                record: keyed(OFFICIAL_AID, 12, WindThreshold::Kt34, 55),
            }],
        )
        .await
        .unwrap();
    assert!(accepted);

    let visible = store.query(&storm(), vec![cycle()]).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].record.max_wind, 55);

    store.checkin(sandbox).await.unwrap();
    assert!(temp.path().join("AL092024").join("a-deck.json").exists());
    assert_eq!(store.query(&storm(), Vec::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_update_rejected_for_wrong_deck_or_missing_sandbox() {
    let temp = TempDir::new().unwrap();
    let store = FileAidStore::new(temp.path());

    let sandbox = store.open_sandbox(&storm(), DeckType::A).await.unwrap();
    let edit = ModifiedRecord {
        edit_type: EditType::Modify,
        record: keyed(OFFICIAL_AID, 12, WindThreshold::Kt34, 55),
    };

    assert!(!store.batch_update(sandbox, DeckType::B, vec![edit.clone()]).await.unwrap());
    let missing = shared::SandboxId(sandbox.0 + 10);
    assert!(!store.batch_update(missing, DeckType::A, vec![edit]).await.unwrap());
}

#[tokio::test]
async fn test_best_track_reads_b_deck() {
    let temp = TempDir::new().unwrap();
    let store = FileAidStore::new(temp.path());

    let sandbox = store.open_sandbox(&storm(), DeckType::B).await.unwrap();
    store
        .batch_update(
            sandbox,
            DeckType::B,
            vec![ModifiedRecord {
                edit_type: EditType::New,
                record: keyed("BEST", 0, WindThreshold::Kt34, 40),
            }],
        )
        .await
        .unwrap();
    store.checkin(sandbox).await.unwrap();

    let best = store.best_track(&storm()).await.unwrap();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].key.aid, "BEST");
    // B-deck edits never leak into the objective aids
    assert!(store.query(&storm(), Vec::new()).await.unwrap().is_empty());
}
