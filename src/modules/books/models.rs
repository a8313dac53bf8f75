use catalog_http::error::AppError;
use catalog_kernel::settings::ValidationSettings;
use serde::{Deserialize, Serialize};

use crate::utils::payload::Payload;

/// A row of the `Books` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Store-assigned identity
    pub book_id: i64,
    pub title: String,
    pub publication_year: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

/// Validated input for add-book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub publication_year: i64,
}

impl NewBook {
    pub fn from_payload(
        body: &serde_json::Value,
        validation: &ValidationSettings,
    ) -> Result<Self, AppError> {
        let payload = Payload::new(body, validation)?;
        payload.require(&["title", "publication_year"])?;

        Ok(Self {
            title: payload.text("title")?,
            publication_year: payload.integer("publication_year")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_book() {
        let book = NewBook::from_payload(
            &json!({"title": "Dune", "publication_year": "1965"}),
            &ValidationSettings::default(),
        )
        .unwrap();
        assert_eq!(
            book,
            NewBook {
                title: "Dune".to_string(),
                publication_year: 1965
            }
        );
    }

    #[test]
    fn empty_title_is_missing() {
        let err = NewBook::from_payload(
            &json!({"title": "", "publication_year": 2000}),
            &ValidationSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing fields");
    }

    #[test]
    fn year_zero_follows_validation_settings() {
        let body = json!({"title": "Zero", "publication_year": 0});
        assert!(NewBook::from_payload(&body, &ValidationSettings::default()).is_err());

        let lenient = ValidationSettings {
            zero_is_missing: false,
        };
        assert_eq!(
            NewBook::from_payload(&body, &lenient)
                .unwrap()
                .publication_year,
            0
        );
    }
}
