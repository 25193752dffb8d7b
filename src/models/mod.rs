//! Data models for Perpus

pub mod book;
pub mod borrowing;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails};
pub use borrowing::{BorrowStatus, Borrowing, BorrowingDetails};
pub use user::{Role, User, UserClaims};
