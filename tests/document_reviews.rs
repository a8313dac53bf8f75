//! Document-backed reviews against a live MongoDB.
//!
//! Run with `CATALOG_TEST_MONGO_URI=mongodb://127.0.0.1:27017 cargo test -- --ignored`.

use catalog_db::DocumentDb;
use catalog_kernel::settings::ReviewSettings;
use catalog_service::modules::reviews::{
    models::{NewReview, ReviewId},
    store::ReviewStore,
    DocumentReviewStore,
};
use serde_json::Number;

async fn store() -> Option<DocumentReviewStore> {
    let uri = std::env::var("CATALOG_TEST_MONGO_URI").ok()?;
    let settings = ReviewSettings {
        mongo_uri: uri,
        mongo_database: format!("catalog_test_{}", std::process::id()),
        ..ReviewSettings::default()
    };
    let db = DocumentDb::connect(&settings).await.unwrap();
    db.ping().await.unwrap();
    db.collection().drop().await.unwrap();
    Some(DocumentReviewStore::new(db))
}

fn review(book_id: i64, user: &str) -> NewReview {
    NewReview {
        book_id,
        user: user.to_string(),
        rating: Number::from(4),
        comment: format!("from {user}"),
    }
}

#[tokio::test]
#[ignore = "requires CATALOG_TEST_MONGO_URI"]
async fn insert_then_list_for_book() {
    let Some(store) = store().await else {
        return;
    };

    store.insert(review(1, "ana")).await.unwrap();
    store.insert(review(2, "bo")).await.unwrap();

    let reviews = store.list_for_book(1).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].user, "ana");
    assert_eq!(reviews[0].rating, Number::from(4));
    assert_eq!(reviews[0].comment, "from ana");
    assert!(matches!(reviews[0].id, ReviewId::Document(_)));
    assert!(reviews[0].created_at.is_some());

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|r| r.book_title.is_none()));

    assert!(store.list_for_book(404).await.unwrap().is_empty());
}
