use fragments::{Conversion, Fragment, Listing};
use storage::FilesystemStore;

use crate::common::create;

async fn temp_store() -> (FilesystemStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = FilesystemStore::new(dir.path().join("fragments"), 1024 * 1024)
        .await
        .unwrap();
    (store, dir)
}

#[tokio::test]
async fn full_lifecycle_on_disk() {
    let (store, _dir) = temp_store().await;
    let fragment = create(&store, "user1@example.com", "text/markdown", b"## Title").await;

    let loaded = Fragment::by_id(&store, "user1@example.com", fragment.id())
        .await
        .unwrap();
    assert_eq!(loaded, fragment);
    loaded.verify(&store).await.unwrap();

    let html = loaded.convert_data(&store, "text/html").await.unwrap();
    let Conversion::Converted(html) = html else {
        panic!("markdown should convert to html");
    };
    assert!(String::from_utf8(html).unwrap().contains("<h2>Title</h2>"));

    let listing = Fragment::by_user(&store, "user1@example.com", false)
        .await
        .unwrap();
    assert_eq!(listing, Listing::Ids(vec![fragment.id().to_string()]));

    Fragment::delete(&store, "user1@example.com", fragment.id())
        .await
        .unwrap();
    assert!(
        Fragment::by_id(&store, "user1@example.com", fragment.id())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(fragment.get_data(&store).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn fragments_reload_from_a_fresh_store_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragments");

    let fragment = {
        let store = FilesystemStore::new(path.clone(), 1024).await.unwrap();
        create(&store, "owner", "application/json", br#"{"a":1}"#).await
    };

    let store = FilesystemStore::new(path, 1024).await.unwrap();
    let loaded = Fragment::by_id(&store, "owner", fragment.id()).await.unwrap();
    assert_eq!(loaded.created(), fragment.created());
    assert_eq!(loaded.updated(), fragment.updated());
    assert_eq!(
        loaded.convert_data(&store, "text/plain").await.unwrap(),
        Conversion::Converted(br#"{"a":1}"#.to_vec())
    );
}
