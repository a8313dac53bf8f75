use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::Connection;

use crate::StoreError;

/// Connection factory for the relational store.
///
/// No connection is held between calls: every [`SqliteDb::call`] opens the
/// database file on a blocking worker, runs the closure and drops the
/// connection before returning.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    path: PathBuf,
}

impl SqliteDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection.
    pub fn open(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }

    /// Run `f` against a fresh connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            f(&conn)
        })
        .await?;
        Ok(result?)
    }

    /// Create the parent directory if needed and apply `statements` in a single batch.
    pub fn bootstrap<'a>(&self, statements: impl IntoIterator<Item = &'a str>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let batch: String = statements.into_iter().collect::<Vec<_>>().join("\n");
        let conn = self
            .open()
            .with_context(|| format!("failed to open sqlite database {}", self.path.display()))?;
        conn.execute_batch(&batch)
            .context("failed to apply sqlite schema")?;

        tracing::info!(
            target: "catalog-db",
            path = %self.path.display(),
            "sqlite schema ensured"
        );
        Ok(())
    }
}
