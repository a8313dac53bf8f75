use catalog_http::error::AppError;
use catalog_kernel::settings::ValidationSettings;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::utils::payload::Payload;

/// Row id under the relational backend, document id (hex) under the document backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReviewId {
    Row(i64),
    Document(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: i64,
    /// Only populated by the relational all-reviews listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
    pub user: String,
    pub rating: Number,
    pub comment: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookReviewsResponse {
    pub book_id: i64,
    pub reviews: Vec<Review>,
}

/// Validated input for add-review.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub book_id: i64,
    pub user: String,
    pub rating: Number,
    pub comment: String,
}

impl NewReview {
    pub fn from_payload(
        body: &serde_json::Value,
        validation: &ValidationSettings,
    ) -> Result<Self, AppError> {
        let payload = Payload::new(body, validation)?;
        payload.require(&["book_id", "user", "rating", "comment"])?;

        Ok(Self {
            book_id: payload.integer("book_id")?,
            user: payload.text("user")?,
            rating: payload.number("rating")?,
            comment: payload.text("comment")?,
        })
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, the shape SQLite's `CURRENT_TIMESTAMP` produces.
pub fn current_timestamp() -> Result<String, time::error::Format> {
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    time::OffsetDateTime::now_utc().format(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_coerces_book_id() {
        let review = NewReview::from_payload(
            &json!({"book_id": "3", "user": "ana", "rating": 4, "comment": "good"}),
            &ValidationSettings::default(),
        )
        .unwrap();
        assert_eq!(review.book_id, 3);
        assert_eq!(review.rating, Number::from(4));
    }

    #[test]
    fn non_numeric_book_id_is_a_validation_error() {
        let err = NewReview::from_payload(
            &json!({"book_id": "three", "user": "ana", "rating": 4, "comment": "good"}),
            &ValidationSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "book_id must be an integer");
    }

    #[test]
    fn rating_zero_is_missing_by_default() {
        let body = json!({"book_id": 1, "user": "ana", "rating": 0, "comment": "meh"});
        let err = NewReview::from_payload(&body, &ValidationSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "Missing fields");

        let lenient = ValidationSettings {
            zero_is_missing: false,
        };
        assert_eq!(
            NewReview::from_payload(&body, &lenient).unwrap().rating,
            Number::from(0)
        );
    }

    #[test]
    fn book_title_is_omitted_when_absent() {
        let review = Review {
            id: ReviewId::Document("65f0c0ffee".to_string()),
            book_id: 1,
            book_title: None,
            user: "ana".to_string(),
            rating: Number::from(5),
            comment: "great".to_string(),
            created_at: None,
        };
        let value = serde_json::to_value(&review).unwrap();
        assert!(value.get("book_title").is_none());
        assert_eq!(value["id"], json!("65f0c0ffee"));
        assert_eq!(value["created_at"], json!(null));
    }

    #[test]
    fn timestamp_matches_sqlite_shape() {
        let ts = current_timestamp().unwrap();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
