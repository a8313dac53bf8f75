use thiserror::Error;

/// Any failure raised while talking to a datastore.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Document(#[from] mongodb::error::Error),

    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("malformed stored record: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
