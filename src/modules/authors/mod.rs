pub mod models;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use catalog_db::{SqliteDb, StoreError};
use catalog_http::error::AppError;
use catalog_kernel::{Module, Schema};
use serde_json::json;

use models::{Author, AuthorsResponse};

pub const AUTHORS_SCHEMA: Schema = Schema {
    id: "authors_table",
    up: r#"
        CREATE TABLE IF NOT EXISTS Authors (
            author_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name      TEXT NOT NULL
        );
        "#,
};

/// Read-only author listing. Authors are seeded out of band.
pub struct AuthorsModule {
    db: SqliteDb,
}

impl AuthorsModule {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/api/authors", get(list_authors))
            .with_state(self.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/api/authors": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "All authors in store order",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/AuthorList" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Store error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "author_id": { "type": "integer" },
                            "name": { "type": "string" }
                        },
                        "required": ["author_id", "name"]
                    },
                    "AuthorList": {
                        "type": "object",
                        "properties": {
                            "authors": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Author" }
                            }
                        },
                        "required": ["authors"]
                    }
                }
            }
        }))
    }

    fn schema(&self) -> Vec<Schema> {
        vec![AUTHORS_SCHEMA]
    }
}

pub async fn fetch_authors(db: &SqliteDb) -> Result<Vec<Author>, StoreError> {
    db.call(|conn| {
        let mut stmt = conn.prepare("SELECT author_id, name FROM Authors")?;
        let authors = stmt
            .query_map([], |row| {
                Ok(Author {
                    author_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    })
    .await
}

async fn list_authors(State(db): State<SqliteDb>) -> Result<Json<AuthorsResponse>, AppError> {
    let authors = fetch_authors(&db).await?;
    Ok(Json(AuthorsResponse { authors }))
}

pub fn create_module(db: SqliteDb) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(db))
}
