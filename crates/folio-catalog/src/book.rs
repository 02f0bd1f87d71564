//! The catalog record and its field constraints.
//!
//! A record is either fully absent or fully valid: the create path
//! validates the whole field set, the update path validates every supplied
//! field before the merge is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::BookId;

use crate::error::{CatalogError, Result};

/// Minimum title length in characters.
pub const TITLE_MIN_CHARS: usize = 2;
/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;
/// Maximum rating value.
pub const RATING_MAX: f64 = 5.0;

/// A catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identity.
    pub id: BookId,
    /// Unique title, 2-100 characters.
    pub title: String,
    /// Optional description, at most 500 characters.
    pub description: Option<String>,
    /// Non-negative price.
    pub price: f64,
    /// Units in stock.
    pub stock: u32,
    /// Category, non-empty.
    pub category: String,
    /// Author, non-empty.
    pub author: String,
    /// Rating in [0, 5].
    pub rating: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// The full field set for creating a record.
///
/// Unknown fields are rejected at deserialization time rather than
/// silently dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    /// Unique title, 2-100 characters.
    pub title: String,
    /// Optional description, at most 500 characters.
    #[serde(default)]
    pub description: Option<String>,
    /// Non-negative price.
    pub price: f64,
    /// Units in stock.
    pub stock: u32,
    /// Category, non-empty.
    pub category: String,
    /// Author, non-empty.
    pub author: String,
    /// Rating in [0, 5].
    pub rating: f64,
}

impl NewBook {
    /// Validates the full field set against the record constraints.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidInput` on the first violated
    /// constraint.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if let Some(description) = self.description.as_deref() {
            validate_description(description)?;
        }
        validate_price(self.price)?;
        validate_non_empty("category", &self.category)?;
        validate_non_empty("author", &self.author)?;
        validate_rating(self.rating)?;
        Ok(())
    }
}

/// A partial field set for updating a record.
///
/// Each field is explicitly optional; only supplied fields change.
/// Unknown fields are rejected rather than silently merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement price.
    pub price: Option<f64>,
    /// Replacement stock count.
    pub stock: Option<u32>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement author.
    pub author: Option<String>,
    /// Replacement rating.
    pub rating: Option<f64>,
}

impl BookPatch {
    /// Validates every supplied field against the record constraints.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidInput` on the first violated
    /// constraint.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(description) = self.description.as_deref() {
            validate_description(description)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(category) = self.category.as_deref() {
            validate_non_empty("category", category)?;
        }
        if let Some(author) = self.author.as_deref() {
            validate_non_empty("author", author)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }

    /// Merges the supplied fields into `book`, leaving the rest untouched.
    pub fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(stock) = self.stock {
            book.stock = stock;
        }
        if let Some(category) = &self.category {
            book.category = category.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS || chars > TITLE_MAX_CHARS {
        return Err(CatalogError::invalid_input(format!(
            "title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(CatalogError::invalid_input(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::invalid_input(
            "price must be a non-negative number",
        ));
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<()> {
    if !rating.is_finite() || !(0.0..=RATING_MAX).contains(&rating) {
        return Err(CatalogError::invalid_input(format!(
            "rating must be between 0 and {RATING_MAX}"
        )));
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid_input(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_book() -> NewBook {
        NewBook {
            title: "The Left Hand of Darkness".to_string(),
            description: None,
            price: 12.99,
            stock: 4,
            category: "Fiction".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            rating: 4.6,
        }
    }

    #[test]
    fn valid_book_passes() {
        assert!(valid_book().validate().is_ok());
    }

    #[test]
    fn short_title_rejected() {
        let mut book = valid_book();
        book.title = "x".to_string();
        assert!(matches!(
            book.validate(),
            Err(CatalogError::InvalidInput { .. })
        ));
    }

    #[test]
    fn long_title_rejected() {
        let mut book = valid_book();
        book.title = "x".repeat(101);
        assert!(book.validate().is_err());
    }

    #[test]
    fn long_description_rejected() {
        let mut book = valid_book();
        book.description = Some("d".repeat(501));
        assert!(book.validate().is_err());
    }

    #[test]
    fn negative_price_rejected() {
        let mut book = valid_book();
        book.price = -0.01;
        assert!(book.validate().is_err());
    }

    #[test]
    fn non_finite_price_rejected() {
        let mut book = valid_book();
        book.price = f64::NAN;
        assert!(book.validate().is_err());
    }

    #[test]
    fn out_of_range_rating_rejected() {
        let mut book = valid_book();
        book.rating = 7.0;
        assert!(book.validate().is_err());
    }

    #[test]
    fn blank_category_rejected() {
        let mut book = valid_book();
        book.category = "  ".to_string();
        assert!(book.validate().is_err());
    }

    #[test]
    fn patch_validates_only_supplied_fields() {
        let patch = BookPatch {
            rating: Some(4.0),
            ..BookPatch::default()
        };
        assert!(patch.validate().is_ok());

        let patch = BookPatch {
            rating: Some(7.0),
            ..BookPatch::default()
        };
        assert!(matches!(
            patch.validate(),
            Err(CatalogError::InvalidInput { .. })
        ));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result: std::result::Result<BookPatch, _> =
            serde_json::from_str(r#"{"rating": 4.0, "publisher": "Ace"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let mut book = Book {
            id: BookId::generate(),
            title: "Dune".to_string(),
            description: None,
            price: 9.99,
            stock: 3,
            category: "Fiction".to_string(),
            author: "Frank Herbert".to_string(),
            rating: 4.8,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let patch = BookPatch {
            price: Some(11.50),
            stock: Some(0),
            ..BookPatch::default()
        };
        patch.apply(&mut book);

        assert_eq!(book.price, 11.50);
        assert_eq!(book.stock, 0);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.rating, 4.8);
    }
}
