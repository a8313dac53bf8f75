use anyhow::Context;
use catalog_kernel::settings::ReviewSettings;
use mongodb::{
    bson::{doc, Document},
    Client, Collection, Database,
};

/// MongoDB client handle used by document-backed reviews.
///
/// The driver pools connections internally, so a single handle is built at
/// startup and cloned wherever it is needed.
#[derive(Debug, Clone)]
pub struct DocumentDb {
    database: Database,
    collection: String,
}

impl DocumentDb {
    /// Parse the URI and build a client. No network round trip happens here.
    pub async fn connect(settings: &ReviewSettings) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&settings.mongo_uri)
            .await
            .with_context(|| "failed to parse document store URI")?;

        Ok(Self {
            database: client.database(&settings.mongo_database),
            collection: settings.mongo_collection.clone(),
        })
    }

    /// The configured review collection.
    pub fn collection(&self) -> Collection<Document> {
        self.database.collection::<Document>(&self.collection)
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Issue a `ping` command against the configured database.
    pub async fn ping(&self) -> Result<(), crate::StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Ping once and log the outcome. An unreachable server is not fatal:
    /// requests fail individually until it comes back.
    pub async fn ping_or_warn(&self) {
        match self.ping().await {
            Ok(()) => tracing::info!(
                target: "catalog-db",
                database = self.database_name(),
                collection = self.collection_name(),
                "document store reachable"
            ),
            Err(err) => tracing::warn!(
                target: "catalog-db",
                database = self.database_name(),
                error = %err,
                "document store ping failed; continuing startup"
            ),
        }
    }
}
