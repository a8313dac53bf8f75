use async_trait::async_trait;
use catalog_db::{DocumentDb, StoreError};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use serde_json::Number;

use super::{
    models::{current_timestamp, NewReview, Review, ReviewId},
    store::ReviewStore,
};

/// Reviews as free-form documents in a MongoDB collection.
///
/// There is no join with `Books`, so listings never carry `book_title`, and no
/// sort is requested from the server.
#[derive(Debug, Clone)]
pub struct DocumentReviewStore {
    db: DocumentDb,
}

impl DocumentReviewStore {
    pub fn new(db: DocumentDb) -> Self {
        Self { db }
    }

    async fn find(&self, filter: Document) -> Result<Vec<Review>, StoreError> {
        let documents: Vec<Document> = self.db.collection().find(filter).await?.try_collect().await?;
        documents.iter().map(review_from_document).collect()
    }
}

pub fn review_to_document(review: &NewReview, created_at: String) -> Document {
    doc! {
        "book_id": review.book_id,
        "user": review.user.as_str(),
        "rating": rating_to_bson(&review.rating),
        "comment": review.comment.as_str(),
        "created_at": created_at,
    }
}

fn rating_to_bson(rating: &Number) -> Bson {
    match rating.as_i64() {
        Some(i) => Bson::Int64(i),
        None => Bson::Double(rating.as_f64().unwrap_or_default()),
    }
}

fn integer_field(document: &Document, field: &str) -> Result<i64, StoreError> {
    match document.get(field) {
        Some(Bson::Int32(i)) => Ok(i64::from(*i)),
        Some(Bson::Int64(i)) => Ok(*i),
        Some(Bson::Double(f)) if f.fract() == 0.0 => Ok(*f as i64),
        other => Err(StoreError::malformed(format!(
            "review field '{field}' is not an integer: {other:?}"
        ))),
    }
}

fn number_field(document: &Document, field: &str) -> Result<Number, StoreError> {
    let number = match document.get(field) {
        Some(Bson::Int32(i)) => Some(Number::from(*i)),
        Some(Bson::Int64(i)) => Some(Number::from(*i)),
        Some(Bson::Double(f)) => Number::from_f64(*f),
        _ => None,
    };
    number.ok_or_else(|| StoreError::malformed(format!("review field '{field}' is not a number")))
}

fn text_field(document: &Document, field: &str) -> Result<String, StoreError> {
    match document.get(field) {
        Some(Bson::String(s)) => Ok(s.clone()),
        other => Err(StoreError::malformed(format!(
            "review field '{field}' is not a string: {other:?}"
        ))),
    }
}

/// Documents written by other tools may lack `created_at` or carry a BSON date.
fn timestamp_field(document: &Document, field: &str) -> Option<String> {
    match document.get(field) {
        Some(Bson::String(s)) => Some(s.clone()),
        Some(Bson::DateTime(dt)) => dt.try_to_rfc3339_string().ok(),
        _ => None,
    }
}

pub fn review_from_document(document: &Document) -> Result<Review, StoreError> {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => return Err(StoreError::malformed("review document has no _id")),
    };

    Ok(Review {
        id: ReviewId::Document(id),
        book_id: integer_field(document, "book_id")?,
        book_title: None,
        user: text_field(document, "user")?,
        rating: number_field(document, "rating")?,
        comment: text_field(document, "comment")?,
        created_at: timestamp_field(document, "created_at"),
    })
}

#[async_trait]
impl ReviewStore for DocumentReviewStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        self.find(doc! {}).await
    }

    async fn list_for_book(&self, book_id: i64) -> Result<Vec<Review>, StoreError> {
        self.find(doc! { "book_id": book_id }).await
    }

    async fn insert(&self, review: NewReview) -> Result<(), StoreError> {
        let created_at = current_timestamp()
            .map_err(|err| StoreError::malformed(format!("cannot format created_at: {err}")))?;
        let result = self
            .db
            .collection()
            .insert_one(review_to_document(&review, created_at))
            .await?;
        tracing::debug!(id = %result.inserted_id, book_id = review.book_id, "review document inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn document_round_trips_into_review() {
        let new_review = NewReview {
            book_id: 12,
            user: "ana".to_string(),
            rating: Number::from(4),
            comment: "solid".to_string(),
        };
        let oid = ObjectId::new();
        let mut document = review_to_document(&new_review, "2026-01-02 03:04:05".to_string());
        document.insert("_id", oid);

        let review = review_from_document(&document).unwrap();
        assert_eq!(review.id, ReviewId::Document(oid.to_hex()));
        assert_eq!(review.book_id, 12);
        assert_eq!(review.book_title, None);
        assert_eq!(review.user, "ana");
        assert_eq!(review.rating, Number::from(4));
        assert_eq!(review.comment, "solid");
        assert_eq!(review.created_at.as_deref(), Some("2026-01-02 03:04:05"));
    }

    #[test]
    fn tolerates_documents_from_other_writers() {
        let document = doc! {
            "_id": ObjectId::new(),
            "book_id": 3_i32,
            "user": "bo",
            "rating": 2.5,
            "comment": "ok",
        };
        let review = review_from_document(&document).unwrap();
        assert_eq!(review.book_id, 3);
        assert_eq!(review.rating.as_f64(), Some(2.5));
        assert_eq!(review.created_at, None);
    }

    #[test]
    fn rejects_documents_without_integer_book_id() {
        let document = doc! {
            "_id": ObjectId::new(),
            "book_id": "seven",
            "user": "bo",
            "rating": 1,
            "comment": "ok",
        };
        let err = review_from_document(&document).unwrap_err();
        assert!(err.to_string().contains("book_id"));
    }

    #[test]
    fn rejects_documents_without_text_fields() {
        let missing_user = doc! {
            "_id": ObjectId::new(),
            "book_id": 3_i64,
            "rating": 1,
            "comment": "ok",
        };
        let err = review_from_document(&missing_user).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
        assert!(err.to_string().contains("user"));

        let numeric_comment = doc! {
            "_id": ObjectId::new(),
            "book_id": 3_i64,
            "user": "bo",
            "rating": 1,
            "comment": 42,
        };
        let err = review_from_document(&numeric_comment).unwrap_err();
        assert!(err.to_string().contains("comment"));
    }
}
