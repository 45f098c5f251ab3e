use fragments::{Fragment, Listing};
use storage::MemoryStore;

use crate::common::create;

#[tokio::test]
async fn listing_ids_matches_expanded_listing() {
    let store = MemoryStore::new();
    let a = create(&store, "user1", "text/plain", b"a").await;
    let b = create(&store, "user1", "text/markdown", b"# b").await;
    create(&store, "user2", "text/plain", b"other owner").await;

    let ids = Fragment::by_user(&store, "user1", false).await.unwrap();
    let expanded = Fragment::by_user(&store, "user1", true).await.unwrap();

    assert!(matches!(ids, Listing::Ids(_)));
    assert_eq!(ids.len(), 2);
    assert_eq!(ids.ids(), expanded.ids());

    let mut expected = vec![a.id(), b.id()];
    expected.sort();
    let mut listed = ids.ids();
    listed.sort();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn expanded_listing_hydrates_full_metadata() {
    let store = MemoryStore::new();
    let fragment = create(&store, "user1", "application/json", br#"{"a":1}"#).await;

    let Listing::Expanded(fragments) = Fragment::by_user(&store, "user1", true).await.unwrap()
    else {
        panic!("expected expanded listing");
    };
    assert_eq!(fragments, vec![fragment]);
}

#[tokio::test]
async fn deleted_fragments_leave_the_listing() {
    let store = MemoryStore::new();
    let keep = create(&store, "user1", "text/plain", b"keep").await;
    let gone = create(&store, "user1", "text/plain", b"gone").await;

    Fragment::delete(&store, "user1", gone.id()).await.unwrap();

    let listing = Fragment::by_user(&store, "user1", false).await.unwrap();
    assert_eq!(listing, Listing::Ids(vec![keep.id().to_string()]));
}
