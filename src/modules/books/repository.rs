use catalog_db::{SqliteDb, StoreError};
use catalog_kernel::Schema;
use rusqlite::params;

use super::models::{Book, NewBook};

pub const BOOKS_SCHEMA: Schema = Schema {
    id: "books_table",
    up: r#"
        CREATE TABLE IF NOT EXISTS Books (
            book_id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title            TEXT    NOT NULL,
            publication_year INTEGER NOT NULL
        );
        "#,
};

/// Book queries against the relational store.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: SqliteDb,
}

impl BookRepository {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }

    /// All books, in store-native order.
    pub async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.db
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT book_id, title, publication_year FROM Books")?;
                let books = stmt
                    .query_map([], |row| {
                        Ok(Book {
                            book_id: row.get(0)?,
                            title: row.get(1)?,
                            publication_year: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(books)
            })
            .await
    }

    pub async fn add_book(&self, book: NewBook) -> Result<(), StoreError> {
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO Books (title, publication_year) VALUES (?1, ?2)",
                    params![book.title, book.publication_year],
                )?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(dir: &tempfile::TempDir) -> BookRepository {
        let db = SqliteDb::new(dir.path().join("books.db"));
        db.bootstrap([BOOKS_SCHEMA.up]).unwrap();
        BookRepository::new(db)
    }

    #[tokio::test]
    async fn add_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);
        assert!(repo.list_books().await.unwrap().is_empty());

        repo.add_book(NewBook {
            title: "Neuromancer".to_string(),
            publication_year: 1984,
        })
        .await
        .unwrap();

        let books = repo.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Neuromancer");
        assert_eq!(books[0].publication_year, 1984);
        assert!(books[0].book_id > 0);
    }

    #[tokio::test]
    async fn missing_table_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = BookRepository::new(SqliteDb::new(dir.path().join("empty.db")));
        let err = repo.list_books().await.unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }
}
