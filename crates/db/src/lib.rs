//! Store handles for the catalog: a per-call SQLite connection factory and a
//! MongoDB client factory for document-backed reviews.

pub mod document;
pub mod error;
pub mod sqlite;

pub use document::DocumentDb;
pub use error::StoreError;
pub use sqlite::SqliteDb;
