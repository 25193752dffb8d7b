//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookUpdate, NewBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, publisher, year, stock, cover)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(book.stock)
        .bind(&book.cover)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update book fields; absent fields keep their current value
    pub async fn update(&self, id: i32, update: &BookUpdate) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                publisher = COALESCE($4, publisher),
                year = COALESCE($5, year),
                stock = COALESCE($6, stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.publisher)
        .bind(update.year)
        .bind(update.stock)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Replace the book's cover path, returning the previous one
    pub async fn set_cover(&self, id: i32, cover: &str) -> AppResult<Option<String>> {
        let previous: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE books b
            SET cover = $2, updated_at = NOW()
            FROM (SELECT id, cover FROM books WHERE id = $1) old
            WHERE b.id = old.id
            RETURNING old.cover
            "#,
        )
        .bind(id)
        .bind(cover)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(previous)
    }

    /// Delete a book, returning the deleted row so the caller can
    /// clean up the cover blob. Ledger rows referencing the book are
    /// removed by the cascading foreign key.
    pub async fn delete(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("DELETE FROM books WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
