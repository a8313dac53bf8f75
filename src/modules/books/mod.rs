pub mod models;
pub mod repository;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use catalog_db::SqliteDb;
use catalog_http::error::AppError;
use catalog_kernel::{settings::ValidationSettings, InitCtx, Module, Schema};
use serde_json::json;

use crate::utils::MessageResponse;
use models::{BooksResponse, NewBook};
use repository::{BookRepository, BOOKS_SCHEMA};

#[derive(Clone)]
pub struct BooksState {
    repository: BookRepository,
    validation: ValidationSettings,
}

/// Book listing and creation
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(db: SqliteDb, validation: ValidationSettings) -> Self {
        Self {
            state: BooksState {
                repository: BookRepository::new(db),
                validation,
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            zero_is_missing = self.state.validation.zero_is_missing,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/api/books", get(list_books))
            .route("/api/add_book", post(add_book))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/api/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books in store order",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookList" }
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
                },
                "/api/add_book": {
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Book stored",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing or malformed fields",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
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
                    "Book": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer", "description": "Store-assigned identity" },
                            "title": { "type": "string" },
                            "publication_year": { "type": "integer" }
                        },
                        "required": ["book_id", "title", "publication_year"]
                    },
                    "BookList": {
                        "type": "object",
                        "properties": {
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["books"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "publication_year": { "type": "integer" }
                        },
                        "required": ["title", "publication_year"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn schema(&self) -> Vec<Schema> {
        vec![BOOKS_SCHEMA]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<BooksResponse>, AppError> {
    let books = state.repository.list_books().await?;
    Ok(Json(BooksResponse { books }))
}

async fn add_book(
    State(state): State<BooksState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = payload?;
    let book = NewBook::from_payload(&body, &state.validation)?;

    tracing::info!(title = %book.title, year = book.publication_year, "adding book");
    state.repository.add_book(book).await?;

    Ok(Json(MessageResponse::new("Book added successfully")))
}

/// Create a new instance of the books module
pub fn create_module(db: SqliteDb, validation: ValidationSettings) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db, validation))
}
