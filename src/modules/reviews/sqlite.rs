use async_trait::async_trait;
use catalog_db::{SqliteDb, StoreError};
use catalog_kernel::Schema;
use rusqlite::{
    params,
    types::{Type, Value, ValueRef},
    Row,
};
use serde_json::Number;

use super::{
    models::{NewReview, Review, ReviewId},
    store::ReviewStore,
};
use crate::modules::books::repository::BOOKS_SCHEMA;

pub const REVIEWS_SCHEMA: Schema = Schema {
    id: "reviews_table",
    up: r#"
        CREATE TABLE IF NOT EXISTS Reviews (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id    INTEGER NOT NULL,
            user       TEXT    NOT NULL,
            rating     NUMERIC NOT NULL,
            comment    TEXT    NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_reviews_book_id ON Reviews (book_id);
        "#,
};

// `created_at` has one-second resolution; `id` breaks ties so the latest
// insert still sorts first.
const LIST_ALL: &str = r#"
    SELECT r.id, r.book_id, b.title AS book_title,
           r.user, r.rating, r.comment, r.created_at
    FROM Reviews r
    JOIN Books b ON r.book_id = b.book_id
    ORDER BY r.created_at DESC, r.id DESC
"#;

const LIST_FOR_BOOK: &str = r#"
    SELECT id, book_id, user, rating, comment, created_at
    FROM Reviews
    WHERE book_id = ?1
    ORDER BY created_at DESC, id DESC
"#;

/// Reviews in the `Reviews` table of the relational store.
#[derive(Debug, Clone)]
pub struct SqliteReviewStore {
    db: SqliteDb,
}

impl SqliteReviewStore {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

fn rating_from_sql(row: &Row<'_>, idx: usize) -> rusqlite::Result<Number> {
    let conversion_failure = |ty: Type, message: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, ty, message.into())
    };

    match row.get_ref(idx)? {
        ValueRef::Integer(i) => Ok(Number::from(i)),
        ValueRef::Real(f) => Number::from_f64(f)
            .ok_or_else(|| conversion_failure(Type::Real, format!("rating {f} is not finite"))),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            serde_json::from_str::<Number>(text.trim())
                .map_err(|_| conversion_failure(Type::Text, format!("rating '{text}' is not numeric")))
        }
        ValueRef::Null => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "rating".to_string(),
            Type::Null,
        )),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "rating".to_string(),
            Type::Blob,
        )),
    }
}

fn rating_to_sql(rating: &Number) -> Value {
    match rating.as_i64() {
        Some(i) => Value::Integer(i),
        None => Value::Real(rating.as_f64().unwrap_or_default()),
    }
}

fn map_joined_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: ReviewId::Row(row.get(0)?),
        book_id: row.get(1)?,
        book_title: row.get(2)?,
        user: row.get(3)?,
        rating: rating_from_sql(row, 4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_book_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: ReviewId::Row(row.get(0)?),
        book_id: row.get(1)?,
        book_title: None,
        user: row.get(2)?,
        rating: rating_from_sql(row, 3)?,
        comment: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    /// The all-reviews listing joins against `Books`.
    fn schema(&self) -> Vec<Schema> {
        vec![BOOKS_SCHEMA, REVIEWS_SCHEMA]
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare(LIST_ALL)?;
                let reviews = stmt
                    .query_map([], map_joined_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(reviews)
            })
            .await
    }

    async fn list_for_book(&self, book_id: i64) -> Result<Vec<Review>, StoreError> {
        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare(LIST_FOR_BOOK)?;
                let reviews = stmt
                    .query_map(params![book_id], map_book_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(reviews)
            })
            .await
    }

    async fn insert(&self, review: NewReview) -> Result<(), StoreError> {
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO Reviews (book_id, user, rating, comment) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        review.book_id,
                        review.user,
                        rating_to_sql(&review.rating),
                        review.comment
                    ],
                )?;
                Ok(())
            })
            .await
    }
}
