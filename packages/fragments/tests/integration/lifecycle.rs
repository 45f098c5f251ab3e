use fragments::{Fragment, FragmentError, FragmentStore, NewFragment};
use storage::MemoryStore;

use crate::common::{FlakyStore, create};

#[tokio::test]
async fn set_data_then_get_data_round_trips() {
    let store = MemoryStore::new();
    let payload = b"This is a fragment".to_vec();
    let fragment = create(&store, "user1", "text/plain", &payload).await;

    assert_eq!(fragment.size(), payload.len() as u64);
    assert_eq!(fragment.get_data(&store).await.unwrap(), payload);

    let loaded = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    assert_eq!(loaded.size(), payload.len() as u64);
    assert_eq!(loaded.get_data(&store).await.unwrap(), payload);
}

#[tokio::test]
async fn by_id_twice_returns_identical_metadata() {
    let store = MemoryStore::new();
    let fragment = create(&store, "user1", "text/markdown", b"# hi").await;

    let first = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    let second = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.created(), fragment.created());
    assert_eq!(first.updated(), fragment.updated());
}

#[tokio::test]
async fn delete_removes_metadata_and_data() {
    let store = MemoryStore::new();
    let fragment = create(&store, "user1", "text/plain", b"bye").await;

    Fragment::delete(&store, "user1", fragment.id()).await.unwrap();

    assert!(
        Fragment::by_id(&store, "user1", fragment.id())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(fragment.get_data(&store).await.unwrap_err().is_not_found());
    assert_eq!(store.read_metadata("user1", fragment.id()).await.unwrap(), None);
    assert_eq!(store.read_data("user1", fragment.id()).await.unwrap(), None);
}

#[tokio::test]
async fn replacing_data_changes_size_and_updated() {
    let store = MemoryStore::new();
    let mut fragment = create(&store, "user1", "application/json", br#"{"a":1}"#).await;
    let created = fragment.created();
    let first_update = fragment.updated();

    fragment
        .update_data(&store, "application/json", br#"{"a":1,"b":2}"#)
        .await
        .unwrap();

    let loaded = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    assert_eq!(loaded.size(), 13);
    assert_eq!(loaded.created(), created);
    assert!(loaded.updated() >= first_update);
    loaded.verify(&store).await.unwrap();
}

#[tokio::test]
async fn update_with_different_type_is_rejected() {
    let store = MemoryStore::new();
    let mut fragment = create(&store, "user1", "text/plain", b"plain").await;

    let err = fragment
        .update_data(&store, "application/json", b"{}")
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentError::Validation(_)));

    let loaded = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    assert_eq!(loaded.content_type(), "text/plain");
    assert_eq!(loaded.get_data(&store).await.unwrap(), b"plain");
}

#[tokio::test]
async fn failed_data_write_changes_nothing() {
    let store = FlakyStore::default();
    let mut fragment = create(&store, "user1", "text/plain", b"old").await;
    let before = fragment.clone();

    store.fail_data_writes(true);
    let err = fragment.set_data(&store, b"new data").await.unwrap_err();
    assert!(matches!(err, FragmentError::Storage(_)));

    assert_eq!(fragment, before);
    assert_eq!(fragment.get_data(&store).await.unwrap(), b"old");
    fragment.verify(&store).await.unwrap();
}

#[tokio::test]
async fn failed_metadata_write_after_data_is_reported_as_inconsistent() {
    let store = FlakyStore::default();
    let mut fragment = create(&store, "user1", "text/plain", b"old").await;

    store.fail_metadata_writes(true);
    let err = fragment.set_data(&store, b"new data").await.unwrap_err();
    match &err {
        FragmentError::InconsistentWrite { owner_id, id, .. } => {
            assert_eq!(owner_id, "user1");
            assert_eq!(id, fragment.id());
        }
        other => panic!("expected InconsistentWrite, got {other:?}"),
    }

    // The stored metadata still describes the old payload.
    let stored = Fragment::by_id(&store, "user1", fragment.id()).await.unwrap();
    assert!(matches!(
        stored.verify(&store).await,
        Err(FragmentError::SizeMismatch {
            expected: 3,
            actual: 8,
            ..
        })
    ));

    // Retrying the metadata write reconciles the two.
    store.fail_metadata_writes(false);
    fragment.save(&store).await.unwrap();
    Fragment::by_id(&store, "user1", fragment.id())
        .await
        .unwrap()
        .verify(&store)
        .await
        .unwrap();
}

#[tokio::test]
async fn save_failure_is_a_storage_error() {
    let store = FlakyStore::default();
    store.fail_metadata_writes(true);
    let mut fragment = Fragment::new(NewFragment::new("user1", "text/plain")).unwrap();
    assert!(matches!(
        fragment.save(&store).await,
        Err(FragmentError::Storage(_))
    ));
    assert_eq!(store.read_metadata("user1", fragment.id()).await.unwrap(), None);
}

#[tokio::test]
async fn stored_record_with_unsupported_type_fails_validation_on_load() {
    let store = MemoryStore::new();
    let fragment = create(&store, "user1", "text/plain", b"x").await;
    let mut record = fragment.into_record();
    record.content_type = "image/gif".into();
    store
        .write_metadata("user1", &record.id.clone(), &record)
        .await
        .unwrap();

    assert!(matches!(
        Fragment::by_id(&store, "user1", &record.id).await,
        Err(FragmentError::Validation(_))
    ));
}
