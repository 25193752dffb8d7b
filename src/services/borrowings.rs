//! Borrowing ledger service

use crate::{
    error::AppResult,
    models::borrowing::{Borrowing, BorrowingAdminDetails, BorrowingDetails},
    repository::Repository,
    services::storage::StorageService,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    storage: StorageService,
}

impl BorrowingsService {
    pub fn new(repository: Repository, storage: StorageService) -> Self {
        Self { repository, storage }
    }

    /// Borrow a book for the acting user
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<Borrowing> {
        self.repository.borrowings.borrow(user_id, book_id).await
    }

    /// Return a borrowing owned by the acting user
    pub async fn return_borrowing(&self, borrowing_id: i32, user_id: i32) -> AppResult<Borrowing> {
        self.repository
            .borrowings
            .return_borrowing(borrowing_id, user_id)
            .await
    }

    /// All borrowings of the acting user, enriched with book metadata,
    /// newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        let rows = self.repository.borrowings.list_for_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|(borrowing, book)| {
                let cover_url = self.storage.cover_url(book.cover.as_deref());
                BorrowingDetails {
                    id: borrowing.id,
                    status: borrowing.status,
                    borrow_date: borrowing.borrow_date,
                    return_date: borrowing.return_date,
                    book: book.into_details(cover_url),
                }
            })
            .collect())
    }

    /// The whole ledger, enriched with book and borrower, newest first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowingAdminDetails>> {
        let rows = self.repository.borrowings.list_all().await?;
        Ok(rows
            .into_iter()
            .map(|(borrowing, book, user)| {
                let cover_url = self.storage.cover_url(book.cover.as_deref());
                BorrowingAdminDetails {
                    id: borrowing.id,
                    status: borrowing.status,
                    borrow_date: borrowing.borrow_date,
                    return_date: borrowing.return_date,
                    book: book.into_details(cover_url),
                    user,
                }
            })
            .collect())
    }

    /// Count open borrowings
    pub async fn count_open(&self) -> AppResult<i64> {
        self.repository.borrowings.count_open().await
    }
}
