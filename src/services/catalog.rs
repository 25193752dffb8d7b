//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, BookUpdate, NewBook},
    repository::Repository,
    services::storage::StorageService,
};

/// A cover file decoded from the upload, ready to store
#[derive(Debug)]
pub struct CoverUpload {
    pub data: Vec<u8>,
    pub extension: &'static str,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    storage: StorageService,
}

impl CatalogService {
    pub fn new(repository: Repository, storage: StorageService) -> Self {
        Self { repository, storage }
    }

    /// All books with resolved cover URLs
    pub async fn list_books(&self) -> AppResult<Vec<BookDetails>> {
        let books = self.repository.books.list().await?;
        Ok(books.into_iter().map(|b| self.to_details(b)).collect())
    }

    /// One book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        Ok(self.to_details(book))
    }

    /// Create a book, storing the cover blob first if one was uploaded
    pub async fn create_book(
        &self,
        mut book: NewBook,
        cover: Option<CoverUpload>,
    ) -> AppResult<BookDetails> {
        book.validate()?;

        if let Some(upload) = cover {
            book.cover = Some(self.storage.store_cover(&upload.data, upload.extension).await?);
        }

        let created = match self.repository.books.create(&book).await {
            Ok(created) => created,
            Err(e) => {
                // Do not leave an orphaned blob behind a failed insert
                if let Some(ref path) = book.cover {
                    self.storage.remove(path).await;
                }
                return Err(e);
            }
        };

        tracing::info!(book_id = created.id, title = %created.title, "book created");
        Ok(self.to_details(created))
    }

    /// Update book fields; a new cover replaces and deletes the old blob
    pub async fn update_book(
        &self,
        id: i32,
        update: BookUpdate,
        cover: Option<CoverUpload>,
    ) -> AppResult<BookDetails> {
        update.validate()?;

        let mut book = self.repository.books.update(id, &update).await?;

        if let Some(upload) = cover {
            let path = self.storage.store_cover(&upload.data, upload.extension).await?;
            let previous = self.repository.books.set_cover(id, &path).await?;
            if let Some(old) = previous {
                self.storage.remove(&old).await;
            }
            book.cover = Some(path);
        }

        Ok(self.to_details(book))
    }

    /// Delete a book and its cover blob.
    ///
    /// Deliberately not gated on open borrowings: the reference design
    /// allows an administrator to delete a book with outstanding loans,
    /// and the ledger rows cascade with it.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let deleted = self.repository.books.delete(id).await?;
        if let Some(ref cover) = deleted.cover {
            self.storage.remove(cover).await;
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Count all books
    pub async fn count_books(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    fn to_details(&self, book: Book) -> BookDetails {
        let cover_url = self.storage.cover_url(book.cover.as_deref());
        book.into_details(cover_url)
    }
}
