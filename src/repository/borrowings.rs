//! Borrowings (ledger) repository for database operations
//!
//! Borrow and return each mutate two things at once: the ledger row and
//! the book's stock counter. Both run inside a single transaction so the
//! pair is applied atomically; the stock check-and-decrement is a
//! conditional UPDATE so concurrent borrows against the last copy cannot
//! both succeed.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrowing::Borrowing,
        user::UserSummary,
    },
};

/// Name of the partial unique index backing the one-open-borrowing-per-
/// (user, book) invariant.
const OPEN_BORROWING_IDX: &str = "borrowings_open_user_book_idx";

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book: decrement stock and insert an open ledger row as
    /// one atomic transaction.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !book_exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        let already_open: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrowings
                WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_open {
            return Err(AppError::DuplicateBorrow);
        }

        // Conditional decrement: fails the borrow instead of ever taking
        // stock below zero, and serializes concurrent borrows on the row.
        let decremented = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = $1 AND stock > 0")
            .bind(book_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if decremented == 0 {
            return Err(AppError::OutOfStock);
        }

        // The partial unique index closes the duplicate-check race: a
        // concurrent open borrowing committed after our check surfaces
        // here as a constraint violation.
        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (user_id, book_id, status, borrow_date)
            VALUES ($1, $2, 'borrowed', NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some(OPEN_BORROWING_IDX) => {
                AppError::DuplicateBorrow
            }
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            book_id,
            borrowing_id = borrowing.id,
            "book borrowed"
        );

        Ok(borrowing)
    }

    /// Return a borrowing owned by `user_id`: close the ledger row and
    /// increment the book's stock as one atomic transaction.
    ///
    /// A borrowing belonging to another user is reported as not found,
    /// indistinguishable from a missing id.
    pub async fn return_borrowing(&self, borrowing_id: i32, user_id: i32) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(borrowing_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", borrowing_id)))?;

        if !existing.is_open() {
            return Err(AppError::AlreadyReturned);
        }

        let returned = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings
            SET status = 'returned', return_date = NOW()
            WHERE id = $1 AND return_date IS NULL
            RETURNING *
            "#,
        )
        .bind(borrowing_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AlreadyReturned)?;

        sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = $1")
            .bind(existing.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id, borrowing_id, book_id = existing.book_id, "book returned");

        Ok(returned)
    }

    /// All borrowings of one user with their books, newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<(Borrowing, Book)>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.user_id, b.book_id, b.status, b.borrow_date, b.return_date,
                   b.created_at,
                   bk.title, bk.author, bk.publisher, bk.year, bk.stock, bk.cover,
                   bk.created_at AS book_created_at, bk.updated_at AS book_updated_at
            FROM borrowings b
            JOIN books bk ON b.book_id = bk.id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(Self::row_to_pair(&row)?);
        }
        Ok(result)
    }

    /// Every borrowing with book and borrower, newest first (admin view)
    pub async fn list_all(&self) -> AppResult<Vec<(Borrowing, Book, UserSummary)>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.user_id, b.book_id, b.status, b.borrow_date, b.return_date,
                   b.created_at,
                   bk.title, bk.author, bk.publisher, bk.year, bk.stock, bk.cover,
                   bk.created_at AS book_created_at, bk.updated_at AS book_updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM borrowings b
            JOIN books bk ON b.book_id = bk.id
            JOIN users u ON b.user_id = u.id
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let (borrowing, book) = Self::row_to_pair(&row)?;
            let user = UserSummary {
                id: borrowing.user_id,
                name: row.try_get("user_name")?,
                email: row.try_get("user_email")?,
            };
            result.push((borrowing, book, user));
        }
        Ok(result)
    }

    /// Count open borrowings
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrowings WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    fn row_to_pair(row: &sqlx::postgres::PgRow) -> Result<(Borrowing, Book), sqlx::Error> {
        let borrowing = Borrowing {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            book_id: row.try_get("book_id")?,
            status: row.try_get("status")?,
            borrow_date: row.try_get("borrow_date")?,
            return_date: row.try_get("return_date")?,
            created_at: row.try_get("created_at")?,
        };
        let book = Book {
            id: borrowing.book_id,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            publisher: row.try_get("publisher")?,
            year: row.try_get("year")?,
            stock: row.try_get("stock")?,
            cover: row.try_get("cover")?,
            created_at: row.try_get("book_created_at")?,
            updated_at: row.try_get("book_updated_at")?,
        };
        Ok((borrowing, book))
    }
}
