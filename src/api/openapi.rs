//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, dashboard, health};
use crate::error::ErrorResponse;
use crate::models::book::BookDetails;
use crate::models::borrowing::{BorrowStatus, Borrowing, BorrowingAdminDetails, BorrowingDetails};
use crate::models::user::{LoginRequest, RegisterRequest, Role, User, UserSummary};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Perpus API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowings
        borrowings::list_my_borrowings,
        borrowings::create_borrowing,
        borrowings::return_borrowing,
        borrowings::list_all_borrowings,
        // Dashboard
        dashboard::dashboard_summary,
    ),
    components(schemas(
        ErrorResponse,
        User,
        UserSummary,
        Role,
        RegisterRequest,
        LoginRequest,
        auth::AuthResponse,
        auth::MessageResponse,
        BookDetails,
        books::BookResponse,
        books::DeleteResponse,
        Borrowing,
        BorrowStatus,
        BorrowingDetails,
        BorrowingAdminDetails,
        borrowings::BorrowRequest,
        borrowings::BorrowingResponse,
        dashboard::DashboardSummary,
        health::HealthResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication and session tokens"),
        (name = "books", description = "Book catalog"),
        (name = "borrowings", description = "Borrow/return ledger"),
        (name = "dashboard", description = "Aggregate counts")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router serving the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
