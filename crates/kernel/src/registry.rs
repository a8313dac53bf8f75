use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module, Schema};

/// Module registry; modules run their lifecycle hooks in registration order
/// and stop in reverse.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules in registration order
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Initialize every module
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start every module
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} modules", self.modules.len());

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect schema statements from every module, in registration order.
    /// A schema id contributed twice is kept once.
    pub fn collect_schema(&self) -> Vec<(String, Schema)> {
        let mut collected: Vec<(String, Schema)> = Vec::new();

        for module in &self.modules {
            for schema in module.schema() {
                if collected.iter().any(|(_, s)| s.id == schema.id) {
                    tracing::debug!(
                        module = module.name(),
                        schema = schema.id,
                        "skipping duplicate schema"
                    );
                    continue;
                }
                collected.push((module.name().to_string(), schema));
            }
        }

        collected
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        schema_id: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(format!("init:{}", self.name));
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(format!("stop:{}", self.name));
            Ok(())
        }

        fn schema(&self) -> Vec<Schema> {
            vec![Schema {
                id: self.schema_id,
                up: "CREATE TABLE IF NOT EXISTS test (id INTEGER);",
            }]
        }
    }

    fn module(
        name: &'static str,
        schema_id: &'static str,
        events: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<dyn Module> {
        Arc::new(TestModule {
            name,
            schema_id,
            events: events.clone(),
        })
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert_eq!(registry.module_count(), 0);
        assert!(registry.collect_schema().is_empty());
    }

    #[test]
    fn duplicate_schema_ids_are_collected_once() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register(module("books", "books_table", &events));
        registry.register(module("reviews", "books_table", &events));
        registry.register(module("authors", "authors_table", &events));

        let schema = registry.collect_schema();
        let ids: Vec<_> = schema.iter().map(|(m, s)| (m.as_str(), s.id)).collect();
        assert_eq!(
            ids,
            vec![("books", "books_table"), ("authors", "authors_table")]
        );
        assert!(registry.get_module("reviews").is_some());
    }

    #[tokio::test]
    async fn test_module_lifecycle_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register(module("first", "a", &events));
        registry.register(module("second", "b", &events));

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["init:first", "init:second", "stop:second", "stop:first"]
        );
    }
}
