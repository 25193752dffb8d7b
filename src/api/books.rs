//! Book catalog endpoints
//!
//! Create and update accept `multipart/form-data` so the cover image can
//! be uploaded alongside the book fields, as the reference frontend does.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDetails, BookUpdate, NewBook},
    services::{
        catalog::CoverUpload,
        storage::{extension_for_mime, MAX_COVER_BYTES},
    },
};

use super::AuthenticatedUser;

/// Response wrapping a book with a status message
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub message: String,
    pub book: BookDetails,
}

/// Plain status message response
#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// Book fields collected from a multipart form
#[derive(Debug, Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    year: Option<i32>,
    stock: Option<i32>,
    cover: Option<CoverUpload>,
}

/// Read a multipart form into book fields plus an optional cover blob
async fn read_book_form(mut multipart: Multipart) -> AppResult<BookForm> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let extension = extension_for_mime(&content_type).ok_or_else(|| {
                AppError::Validation(format!(
                    "cover: unsupported content type {} (expected image/jpeg or image/png)",
                    content_type
                ))
            })?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("cover: failed to read upload: {}", e)))?;
            if data.len() > MAX_COVER_BYTES {
                return Err(AppError::Validation(
                    "cover: file exceeds the 2 MiB limit".to_string(),
                ));
            }
            form.cover = Some(CoverUpload {
                data: data.to_vec(),
                extension,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("{}: failed to read field: {}", name, e)))?;

        match name.as_str() {
            "title" => form.title = Some(value),
            "author" => form.author = Some(value),
            "publisher" => form.publisher = Some(value),
            "year" => {
                form.year = Some(value.parse().map_err(|_| {
                    AppError::Validation("year: must be an integer".to_string())
                })?)
            }
            "stock" => {
                form.stock = Some(value.parse().map_err(|_| {
                    AppError::Validation("stock: must be an integer".to_string())
                })?)
            }
            other => {
                tracing::debug!("ignoring unknown book form field {}", other);
            }
        }
    }

    Ok(form)
}

fn require_field<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("{}: field is required", field)))
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books with resolved cover URLs", body = Vec<BookDetails>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book (admin only)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    claims.require_admin()?;

    let form = read_book_form(multipart).await?;
    let book = NewBook {
        title: require_field(form.title, "title")?,
        author: require_field(form.author, "author")?,
        publisher: form.publisher,
        year: require_field(form.year, "year")?,
        stock: require_field(form.stock, "stock")?,
        cover: None,
    };

    let created = state.services.catalog.create_book(book, form.cover).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: "Book created successfully".to_string(),
            book: created,
        }),
    ))
}

/// Update an existing book (admin only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<BookResponse>> {
    claims.require_admin()?;

    let form = read_book_form(multipart).await?;
    let update = BookUpdate {
        title: form.title,
        author: form.author,
        publisher: form.publisher,
        year: form.year,
        stock: form.stock,
    };

    let updated = state.services.catalog.update_book(id, update, form.cover).await?;

    Ok(Json(BookResponse {
        message: "Book updated successfully".to_string(),
        book: updated,
    }))
}

/// Delete a book and its cover (admin only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = DeleteResponse),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DeleteResponse>> {
    claims.require_admin()?;

    state.services.catalog.delete_book(id).await?;

    Ok(Json(DeleteResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
