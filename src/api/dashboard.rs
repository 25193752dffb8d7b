//! Dashboard summary endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Aggregate counts for the dashboard
#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Total books in the catalog
    pub total_books: i64,
    /// Open borrowings (not yet returned)
    pub total_borrowed: i64,
    /// Registered users
    pub total_users: i64,
}

/// Aggregate counts of books, open borrowings and users
#[utoipa::path(
    get,
    path = "/dashboard-summary",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregate counts", body = DashboardSummary),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn dashboard_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardSummary>> {
    let total_books = state.services.catalog.count_books().await?;
    let total_borrowed = state.services.borrowings.count_open().await?;
    let total_users = state.services.auth.count_users().await?;

    Ok(Json(DashboardSummary {
        total_books,
        total_borrowed,
        total_users,
    }))
}
