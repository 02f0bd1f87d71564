//! Book API routes.
//!
//! Listing and point reads are public; mutations require an admin caller.
//!
//! ## Routes
//!
//! - `GET    /books` - List books with optional filters and pagination
//! - `GET    /books/{bookId}` - Get a book by id
//! - `POST   /books` - Create a book
//! - `PATCH  /books/{bookId}` - Update a book
//! - `DELETE /books/{bookId}` - Delete a book

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use folio_catalog::{plan_query, Book, BookPatch, CatalogReader, CatalogWriter, ListParams, NewBook};
use folio_core::BookId;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request to create a book.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBookRequest {
    /// Title (must be unique, 2-100 characters).
    pub title: String,
    /// Optional description (at most 500 characters).
    #[serde(default)]
    pub description: Option<String>,
    /// Non-negative price.
    pub price: f64,
    /// Units in stock.
    pub stock: u32,
    /// Category.
    pub category: String,
    /// Author.
    pub author: String,
    /// Rating in [0, 5].
    pub rating: f64,
}

impl From<CreateBookRequest> for NewBook {
    fn from(req: CreateBookRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            stock: req.stock,
            category: req.category,
            author: req.author,
            rating: req.rating,
        }
    }
}

/// Request to update a book. Only supplied fields change; unknown fields
/// are rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookRequest {
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

impl From<UpdateBookRequest> for BookPatch {
    fn from(req: UpdateBookRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            stock: req.stock,
            category: req.category,
            author: req.author,
            rating: req.rating,
        }
    }
}

/// A book as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    /// Store-assigned identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price.
    pub price: f64,
    /// Units in stock.
    pub stock: u32,
    /// Category.
    pub category: String,
    /// Author.
    pub author: String,
    /// Rating.
    pub rating: f64,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.title,
            description: book.description,
            price: book.price,
            stock: book.stock,
            category: book.category,
            author: book.author,
            rating: book.rating,
            created_at: book.created_at.to_rfc3339(),
            updated_at: book.updated_at.to_rfc3339(),
        }
    }
}

/// List books response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksResponse {
    /// Books on this page.
    pub books: Vec<BookResponse>,
    /// Total pages for the filter; 0 when nothing matches.
    pub total_pages: u64,
    /// The requested page number.
    pub current_page: u64,
}

/// Delete confirmation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteBookResponse {
    /// Confirmation message.
    pub message: String,
}

/// Creates book routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:book_id",
            get(get_book).patch(update_book).delete(delete_book),
        )
}

/// List books.
///
/// GET /api/v1/books
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    params(
        ("category" = Option<String>, Query, description = "Exact category filter"),
        ("author" = Option<String>, Query, description = "Exact author filter"),
        ("rating" = Option<String>, Query, description = "Minimum rating filter"),
        ("title" = Option<String>, Query, description = "Title substring filter (case-insensitive)"),
        ("page" = Option<String>, Query, description = "Page number (default 1)"),
        ("limit" = Option<String>, Query, description = "Page size (default 10, max 100)"),
        ("sortBy" = Option<String>, Query, description = "Sort field: title, price, rating, or stock"),
        ("order" = Option<String>, Query, description = "Sort direction: asc (default) or desc"),
    ),
    responses(
        (status = 200, description = "Books listed", body = ListBooksResponse),
        (status = 400, description = "Invalid query parameter", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn list_books(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(request_id = %ctx.request_id, "Listing books");

    let spec = plan_query(&params)?;
    let reader = CatalogReader::new(state.store());
    let page = reader.list(&spec).await?;

    Ok(Json(ListBooksResponse {
        books: page.books.into_iter().map(BookResponse::from).collect(),
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

/// Get a book by id.
///
/// GET /api/v1/books/{bookId}
#[utoipa::path(
    get,
    path = "/api/v1/books/{bookId}",
    tag = "books",
    params(
        ("bookId" = String, Path, description = "Book identifier")
    ),
    responses(
        (status = 200, description = "Book found", body = BookResponse),
        (status = 404, description = "Not found", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn get_book(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(request_id = %ctx.request_id, book_id = %book_id, "Getting book");

    let id = parse_book_id(&book_id)?;
    let reader = CatalogReader::new(state.store());
    let book = reader.get(id).await?;

    Ok(Json(BookResponse::from(book)))
}

/// Create a book.
///
/// POST /api/v1/books
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid field value", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 409, description = "Title already exists", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub(crate) async fn create_book(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        ApiError::invalid_input(rejection.body_text()).with_request_id(ctx.request_id.clone())
    })?;

    tracing::info!(request_id = %ctx.request_id, title = %req.title, "Creating book");

    let writer = CatalogWriter::new(state.store());
    let created = writer.create(ctx.caller.as_ref(), req.into()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(created))))
}

/// Update a book.
///
/// PATCH /api/v1/books/{bookId}
#[utoipa::path(
    patch,
    path = "/api/v1/books/{bookId}",
    tag = "books",
    params(
        ("bookId" = String, Path, description = "Book identifier")
    ),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid field value", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
        (status = 409, description = "Title already exists", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub(crate) async fn update_book(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        ApiError::invalid_input(rejection.body_text()).with_request_id(ctx.request_id.clone())
    })?;

    tracing::info!(request_id = %ctx.request_id, book_id = %book_id, "Updating book");

    let id = parse_book_id(&book_id)?;
    let writer = CatalogWriter::new(state.store());
    let updated = writer.update(ctx.caller.as_ref(), id, req.into()).await?;

    Ok(Json(BookResponse::from(updated)))
}

/// Delete a book.
///
/// DELETE /api/v1/books/{bookId}
#[utoipa::path(
    delete,
    path = "/api/v1/books/{bookId}",
    tag = "books",
    params(
        ("bookId" = String, Path, description = "Book identifier")
    ),
    responses(
        (status = 200, description = "Book deleted", body = DeleteBookResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub(crate) async fn delete_book(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(request_id = %ctx.request_id, book_id = %book_id, "Deleting book");

    let id = parse_book_id(&book_id)?;
    let writer = CatalogWriter::new(state.store());
    writer.delete(ctx.caller.as_ref(), id).await?;

    Ok(Json(DeleteBookResponse {
        message: "Successfully deleted the book".to_string(),
    }))
}

/// An identifier that cannot be parsed cannot name a record, so it is
/// reported the same way as an unknown one.
fn parse_book_id(raw: &str) -> Result<BookId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found("Could not find a book by this id"))
}
