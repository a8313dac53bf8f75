pub mod document;
pub mod models;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use catalog_http::error::AppError;
use catalog_kernel::{settings::ValidationSettings, InitCtx, Module, Schema};
use serde_json::json;

use crate::utils::MessageResponse;
use models::{BookReviewsResponse, NewReview, ReviewsResponse};
use store::ReviewStore;

pub use document::DocumentReviewStore;
pub use sqlite::SqliteReviewStore;

#[derive(Clone)]
pub struct ReviewsState {
    store: Arc<dyn ReviewStore>,
    validation: ValidationSettings,
}

/// Review listing and creation over whichever [`ReviewStore`] is configured
pub struct ReviewsModule {
    state: ReviewsState,
}

impl ReviewsModule {
    pub fn new(store: Arc<dyn ReviewStore>, validation: ValidationSettings) -> Self {
        Self {
            state: ReviewsState { store, validation },
        }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            backend = self.state.store.backend(),
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/api/reviews", get(list_reviews))
            .route("/api/add_review", post(add_review))
            .route("/api/books/{book_id}/reviews", get(list_book_reviews))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = json!({
            "description": "Store error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/api/reviews": {
                    "get": {
                        "summary": "List all reviews",
                        "description": "Relational backend: newest first, with book_title. Document backend: store order, no book_title.",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {
                                "description": "All reviews",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewList" }
                                    }
                                }
                            },
                            "500": error_response
                        }
                    }
                },
                "/api/add_review": {
                    "post": {
                        "summary": "Add a review",
                        "tags": ["Reviews"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateReview" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Review stored",
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
                            "500": error_response
                        }
                    }
                },
                "/api/books/{book_id}/reviews": {
                    "get": {
                        "summary": "List reviews for one book",
                        "tags": ["Reviews"],
                        "parameters": [{
                            "name": "book_id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Reviews for the book; empty when the book is unknown",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookReviewList" }
                                    }
                                }
                            },
                            "500": error_response
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "description": "Integer row id or document id string",
                                "oneOf": [{ "type": "integer" }, { "type": "string" }]
                            },
                            "book_id": { "type": "integer" },
                            "book_title": { "type": "string" },
                            "user": { "type": "string" },
                            "rating": { "type": "number" },
                            "comment": { "type": "string" },
                            "created_at": { "type": ["string", "null"] }
                        },
                        "required": ["id", "book_id", "user", "rating", "comment", "created_at"]
                    },
                    "ReviewList": {
                        "type": "object",
                        "properties": {
                            "reviews": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Review" }
                            }
                        },
                        "required": ["reviews"]
                    },
                    "BookReviewList": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "reviews": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Review" }
                            }
                        },
                        "required": ["book_id", "reviews"]
                    },
                    "CreateReview": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "user": { "type": "string", "minLength": 1 },
                            "rating": { "type": "number" },
                            "comment": { "type": "string", "minLength": 1 }
                        },
                        "required": ["book_id", "user", "rating", "comment"]
                    }
                }
            }
        }))
    }

    fn schema(&self) -> Vec<Schema> {
        self.state.store.schema()
    }
}

async fn list_reviews(State(state): State<ReviewsState>) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = state.store.list_all().await?;
    Ok(Json(ReviewsResponse { reviews }))
}

async fn add_review(
    State(state): State<ReviewsState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = payload?;
    let review = NewReview::from_payload(&body, &state.validation)?;

    tracing::info!(
        book_id = review.book_id,
        user = %review.user,
        backend = state.store.backend(),
        "adding review"
    );
    state.store.insert(review).await?;

    Ok(Json(MessageResponse::new("Review added")))
}

async fn list_book_reviews(
    State(state): State<ReviewsState>,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookReviewsResponse>, AppError> {
    // Only integer ids match this route.
    let Path(book_id) = book_id.map_err(|_| AppError::not_found("not found"))?;
    let reviews = state.store.list_for_book(book_id).await?;
    Ok(Json(BookReviewsResponse { book_id, reviews }))
}

pub fn create_module(
    store: Arc<dyn ReviewStore>,
    validation: ValidationSettings,
) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(store, validation))
}
