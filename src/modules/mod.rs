pub mod authors;
pub mod books;
pub mod reviews;
pub mod site;

use std::sync::Arc;

use catalog_db::SqliteDb;
use catalog_kernel::{settings::ValidationSettings, ModuleRegistry};

use reviews::store::ReviewStore;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    sqlite: &SqliteDb,
    reviews: Arc<dyn ReviewStore>,
    validation: &ValidationSettings,
) {
    registry.register(books::create_module(sqlite.clone(), validation.clone()));
    registry.register(authors::create_module(sqlite.clone()));
    registry.register(reviews::create_module(reviews, validation.clone()));
    registry.register(site::create_module());
}
