//! Borrowing (ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::book::BookDetails;
use super::user::UserSummary;

/// Borrowing lifecycle status. `Borrowed` is the only open state;
/// `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(BorrowStatus::Borrowed),
            "returned" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as text)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrowing model from database (one row per borrow event)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: BorrowStatus,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Borrowing {
    /// True while the borrowing has not been returned
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Borrowing enriched with its book, for user-facing listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub status: BorrowStatus,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub book: BookDetails,
}

/// Borrowing enriched with book and borrower, for the admin ledger view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingAdminDetails {
    pub id: i32,
    pub status: BorrowStatus,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub book: BookDetails,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("borrowed".parse::<BorrowStatus>().unwrap(), BorrowStatus::Borrowed);
        assert_eq!("returned".parse::<BorrowStatus>().unwrap(), BorrowStatus::Returned);
        assert!("overdue".parse::<BorrowStatus>().is_err());
    }

    #[test]
    fn open_state_is_absence_of_return_date() {
        let mut borrowing = Borrowing {
            id: 1,
            user_id: 1,
            book_id: 1,
            status: BorrowStatus::Borrowed,
            borrow_date: Utc::now(),
            return_date: None,
            created_at: Utc::now(),
        };
        assert!(borrowing.is_open());
        borrowing.return_date = Some(Utc::now());
        assert!(!borrowing.is_open());
    }
}
