//! Query planning: untrusted listing parameters to a validated spec.
//!
//! Nothing a client sends reaches the store uninterpreted. Numeric
//! parameters are parsed and range-checked here; the sort key is checked
//! against a closed whitelist; the page size is clamped so no request can
//! demand an unbounded result set.

use serde::Deserialize;

use crate::book::Book;
use crate::error::{CatalogError, Result};

/// Page number used when the client sends none.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the client sends none.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Upper bound on the page size, whatever the client asks for.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Raw listing parameters as received from the client.
///
/// Every field is an optional string; interpretation happens in
/// [`plan_query`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    /// Exact category filter.
    pub category: Option<String>,
    /// Exact author filter.
    pub author: Option<String>,
    /// Minimum rating filter.
    pub rating: Option<String>,
    /// Title substring filter.
    pub title: Option<String>,
    /// Requested page number.
    pub page: Option<String>,
    /// Requested page size.
    pub limit: Option<String>,
    /// Requested sort field.
    pub sort_by: Option<String>,
    /// Requested sort direction.
    pub order: Option<String>,
}

/// A conjunction of record predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Exclude records with zero stock.
    pub in_stock_only: bool,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact author match.
    pub author: Option<String>,
    /// Minimum rating (inclusive).
    pub min_rating: Option<f64>,
    /// Case-insensitive title substring; stored lowercased.
    pub title_contains: Option<String>,
}

impl BookFilter {
    /// Returns true when `book` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        if self.in_stock_only && book.stock == 0 {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if book.category != category {
                return false;
            }
        }
        if let Some(author) = self.author.as_deref() {
            if book.author != author {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if book.rating < min_rating {
                return false;
            }
        }
        if let Some(needle) = self.title_contains.as_deref() {
            if !book.title.to_lowercase().contains(needle) {
                return false;
            }
        }
        true
    }
}

/// Sortable record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Sort by title.
    Title,
    /// Sort by price.
    Price,
    /// Sort by rating.
    Rating,
    /// Sort by stock count.
    Stock,
}

impl SortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "stock" => Some(Self::Stock),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending (the default).
    #[default]
    Ascending,
    /// Descending.
    Descending,
}

/// A validated sort key + direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by.
    pub key: SortKey,
    /// Direction.
    pub order: SortOrder,
}

/// A validated page descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// Page number, at least 1.
    pub page: u64,
    /// Page size, between 1 and [`MAX_PAGE_SIZE`].
    pub limit: u64,
}

impl PageSpec {
    /// Number of records to skip before this page starts.
    #[must_use]
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// A fully-validated listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Record predicates, always including the in-stock base predicate.
    pub filter: BookFilter,
    /// Optional sort; `None` means store-defined order.
    pub sort: Option<SortSpec>,
    /// Page descriptor.
    pub page: PageSpec,
}

/// Translates raw listing parameters into a validated [`QuerySpec`].
///
/// Listings never return out-of-stock records, so the in-stock predicate
/// is applied unconditionally.
///
/// # Errors
///
/// Returns `CatalogError::InvalidQuery` when `rating`, `page`, or `limit`
/// fail to parse, when `page` or `limit` are non-positive, or when
/// `sortBy` names an unsupported field.
pub fn plan_query(params: &ListParams) -> Result<QuerySpec> {
    let mut filter = BookFilter {
        in_stock_only: true,
        ..BookFilter::default()
    };

    if let Some(category) = non_empty(params.category.as_deref()) {
        filter.category = Some(category.to_string());
    }
    if let Some(author) = non_empty(params.author.as_deref()) {
        filter.author = Some(author.to_string());
    }
    if let Some(raw) = non_empty(params.rating.as_deref()) {
        let rating: f64 = raw.parse().map_err(|_| {
            CatalogError::invalid_query(format!("rating must be a number, got '{raw}'"))
        })?;
        if !rating.is_finite() {
            return Err(CatalogError::invalid_query(format!(
                "rating must be a finite number, got '{raw}'"
            )));
        }
        filter.min_rating = Some(rating);
    }
    if let Some(title) = non_empty(params.title.as_deref()) {
        filter.title_contains = Some(title.to_lowercase());
    }

    let page = parse_positive("page", params.page.as_deref(), DEFAULT_PAGE)?;
    let limit =
        parse_positive("limit", params.limit.as_deref(), DEFAULT_PAGE_SIZE)?.min(MAX_PAGE_SIZE);

    let sort = match non_empty(params.sort_by.as_deref()) {
        Some(raw) => {
            let key = SortKey::parse(raw).ok_or_else(|| {
                CatalogError::invalid_query(format!("unsupported sortBy field '{raw}'"))
            })?;
            // Anything other than an explicit "desc" sorts ascending.
            let order = match params.order.as_deref() {
                Some("desc") => SortOrder::Descending,
                _ => SortOrder::Ascending,
            };
            Some(SortSpec { key, order })
        }
        None => None,
    };

    Ok(QuerySpec {
        filter,
        sort,
        page: PageSpec { page, limit },
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64> {
    let Some(raw) = raw.filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    let value: u64 = raw.parse().map_err(|_| {
        CatalogError::invalid_query(format!("{name} must be a positive integer, got '{raw}'"))
    })?;
    if value == 0 {
        return Err(CatalogError::invalid_query(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_core::BookId;

    fn book(title: &str, category: &str, stock: u32, rating: f64) -> Book {
        Book {
            id: BookId::generate(),
            title: title.to_string(),
            description: None,
            price: 10.0,
            stock,
            category: category.to_string(),
            author: "Author".to_string(),
            rating,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn defaults_apply_when_params_absent() {
        let spec = plan_query(&ListParams::default()).unwrap();
        assert_eq!(spec.page.page, DEFAULT_PAGE);
        assert_eq!(spec.page.limit, DEFAULT_PAGE_SIZE);
        assert!(spec.sort.is_none());
        assert!(spec.filter.in_stock_only);
        assert!(spec.filter.category.is_none());
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let params = ListParams {
            category: Some(String::new()),
            rating: Some(String::new()),
            ..ListParams::default()
        };
        let spec = plan_query(&params).unwrap();
        assert!(spec.filter.category.is_none());
        assert!(spec.filter.min_rating.is_none());
    }

    #[test]
    fn full_parameter_set_plans() {
        let params = ListParams {
            category: Some("Fiction".to_string()),
            author: Some("Le Guin".to_string()),
            rating: Some("4.5".to_string()),
            title: Some("Hand".to_string()),
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
            sort_by: Some("price".to_string()),
            order: Some("desc".to_string()),
        };
        let spec = plan_query(&params).unwrap();

        assert_eq!(spec.filter.category.as_deref(), Some("Fiction"));
        assert_eq!(spec.filter.min_rating, Some(4.5));
        assert_eq!(spec.filter.title_contains.as_deref(), Some("hand"));
        assert_eq!(spec.page, PageSpec { page: 2, limit: 5 });
        assert_eq!(
            spec.sort,
            Some(SortSpec {
                key: SortKey::Price,
                order: SortOrder::Descending,
            })
        );
    }

    #[test]
    fn non_numeric_rating_is_invalid_query() {
        let params = ListParams {
            rating: Some("great".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(
            plan_query(&params),
            Err(CatalogError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn non_finite_rating_is_invalid_query() {
        let params = ListParams {
            rating: Some("NaN".to_string()),
            ..ListParams::default()
        };
        assert!(plan_query(&params).is_err());
    }

    #[test]
    fn zero_or_garbage_page_is_invalid_query() {
        for raw in ["0", "-1", "two"] {
            let params = ListParams {
                page: Some(raw.to_string()),
                ..ListParams::default()
            };
            assert!(
                matches!(plan_query(&params), Err(CatalogError::InvalidQuery { .. })),
                "page '{raw}' should be rejected"
            );
        }
    }

    #[test]
    fn limit_is_clamped_to_maximum() {
        let params = ListParams {
            limit: Some("10000".to_string()),
            ..ListParams::default()
        };
        let spec = plan_query(&params).unwrap();
        assert_eq!(spec.page.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn unknown_sort_field_is_invalid_query() {
        let params = ListParams {
            sort_by: Some("publisher".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(
            plan_query(&params),
            Err(CatalogError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn unknown_order_falls_back_to_ascending() {
        let params = ListParams {
            sort_by: Some("title".to_string()),
            order: Some("sideways".to_string()),
            ..ListParams::default()
        };
        let spec = plan_query(&params).unwrap();
        assert_eq!(spec.sort.unwrap().order, SortOrder::Ascending);
    }

    #[test]
    fn filter_excludes_out_of_stock() {
        let filter = BookFilter {
            in_stock_only: true,
            ..BookFilter::default()
        };
        assert!(filter.matches(&book("Dune", "Fiction", 3, 4.8)));
        assert!(!filter.matches(&book("Dune", "Fiction", 0, 4.8)));
    }

    #[test]
    fn filter_applies_all_predicates_conjunctively() {
        let filter = BookFilter {
            in_stock_only: true,
            category: Some("Fiction".to_string()),
            min_rating: Some(4.0),
            title_contains: Some("dune".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&book("Dune Messiah", "Fiction", 1, 4.2)));
        assert!(!filter.matches(&book("Dune Messiah", "History", 1, 4.2)));
        assert!(!filter.matches(&book("Dune Messiah", "Fiction", 1, 3.9)));
        assert!(!filter.matches(&book("Foundation", "Fiction", 1, 4.2)));
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let filter = BookFilter {
            title_contains: Some("dune".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&book("DUNE", "Fiction", 1, 4.0)));
    }

    #[test]
    fn skip_is_page_minus_one_times_limit() {
        let page = PageSpec { page: 3, limit: 10 };
        assert_eq!(page.skip(), 20);
        let first = PageSpec { page: 1, limit: 10 };
        assert_eq!(first.skip(), 0);
    }
}
