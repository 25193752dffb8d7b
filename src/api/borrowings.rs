//! Borrowing ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{Borrowing, BorrowingAdminDetails, BorrowingDetails},
};

use super::AuthenticatedUser;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Book ID to borrow
    pub book_id: i32,
}

/// Response wrapping the ledger entry with a status message
#[derive(Serialize, ToSchema)]
pub struct BorrowingResponse {
    pub message: String,
    pub borrowing: Borrowing,
}

/// List the acting user's borrowings, open and returned, newest first
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The user's borrowings with book metadata", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.list_for_user(claims.user_id).await?;
    Ok(Json(borrowings))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Ledger entry created, stock decremented", body = BorrowingResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already borrowed by this user, or out of stock")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowingResponse>)> {
    let borrowing = state
        .services
        .borrowings
        .borrow(claims.user_id, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowingResponse {
            message: "Book borrowed successfully".to_string(),
            borrowing,
        }),
    ))
}

/// Return a borrowed book.
/// Only the borrowing's owner can return it; anyone else gets a 404.
#[utoipa::path(
    put,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Ledger entry closed, stock incremented", body = BorrowingResponse),
        (status = 404, description = "Borrowing not found for this user"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state
        .services
        .borrowings
        .return_borrowing(id, claims.user_id)
        .await?;

    Ok(Json(BorrowingResponse {
        message: "Book returned successfully".to_string(),
        borrowing,
    }))
}

/// List every borrowing in the ledger (admin only)
#[utoipa::path(
    get,
    path = "/borrowings/all",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The full ledger with book and borrower metadata", body = Vec<BorrowingAdminDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_all_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingAdminDetails>>> {
    claims.require_admin()?;

    let borrowings = state.services.borrowings.list_all().await?;
    Ok(Json(borrowings))
}
