//! Startup wiring: store handles, module registry, schema and router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use catalog_db::{DocumentDb, SqliteDb};
use catalog_kernel::{settings::ReviewBackend, InitCtx, ModuleRegistry, Settings};

use crate::modules::{
    self,
    reviews::{store::ReviewStore, DocumentReviewStore, SqliteReviewStore},
};

/// Store handles shared by every module for the life of the process.
#[derive(Clone)]
pub struct Stores {
    pub sqlite: SqliteDb,
    pub reviews: Arc<dyn ReviewStore>,
}

impl Stores {
    /// Build handles from settings. A document store that does not answer its
    /// ping is logged and kept; requests against it fail individually.
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let sqlite = SqliteDb::new(&settings.database.sqlite_path);

        let reviews: Arc<dyn ReviewStore> = match settings.reviews.backend {
            ReviewBackend::Sqlite => Arc::new(SqliteReviewStore::new(sqlite.clone())),
            ReviewBackend::Mongo => {
                let documents = DocumentDb::connect(&settings.reviews).await?;
                documents.ping_or_warn().await;
                Arc::new(DocumentReviewStore::new(documents))
            }
        };

        tracing::info!(
            sqlite = %sqlite.path().display(),
            reviews = reviews.backend(),
            "stores configured"
        );

        Ok(Self { sqlite, reviews })
    }
}

pub fn build_registry(settings: &Settings, stores: &Stores) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(
        &mut registry,
        &stores.sqlite,
        stores.reviews.clone(),
        &settings.validation,
    );
    registry
}

/// Apply every module's table definitions to the relational store.
pub fn apply_schema(registry: &ModuleRegistry, sqlite: &SqliteDb) -> anyhow::Result<()> {
    let schema = registry.collect_schema();
    for (module, entry) in &schema {
        tracing::debug!(module = %module, schema = entry.id, "applying schema");
    }
    sqlite.bootstrap(schema.iter().map(|(_, entry)| entry.up))
}

/// A started application: registry plus the router serving it.
pub struct App {
    pub registry: ModuleRegistry,
    pub router: Router,
}

/// Run the module lifecycle up to the point where the router can serve.
pub async fn bootstrap(settings: &Settings, stores: &Stores) -> anyhow::Result<App> {
    let registry = build_registry(settings, stores);
    let ctx = InitCtx { settings };

    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;

    if settings.database.bootstrap_schema {
        apply_schema(&registry, &stores.sqlite).context("schema bootstrap failed")?;
    } else {
        tracing::info!("schema bootstrap disabled; expecting existing tables");
    }

    registry
        .start_all(&ctx)
        .await
        .context("module start failed")?;

    let router = catalog_http::build_router(&registry, &settings.server);
    Ok(App { registry, router })
}
