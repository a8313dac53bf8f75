use async_trait::async_trait;
use axum::{response::Html, routing::get, Router};
use catalog_kernel::Module;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Static landing page at `/`
pub struct SiteModule;

#[async_trait]
impl Module for SiteModule {
    fn name(&self) -> &'static str {
        "site"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(index))
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(SiteModule)
}
