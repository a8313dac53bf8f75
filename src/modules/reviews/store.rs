use async_trait::async_trait;
use catalog_db::StoreError;
use catalog_kernel::Schema;

use super::models::{NewReview, Review};

/// Persistence policy for reviews. Both implementations answer with the same
/// shapes; only the relational one can fill `book_title`.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Tables this backend needs in the relational store.
    fn schema(&self) -> Vec<Schema> {
        vec![]
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError>;

    /// Reviews for one book. An unknown book yields an empty list.
    async fn list_for_book(&self, book_id: i64) -> Result<Vec<Review>, StoreError>;

    async fn insert(&self, review: NewReview) -> Result<(), StoreError>;
}
