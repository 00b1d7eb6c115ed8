use std::sync::Arc;
use async_trait::async_trait;
use crate::books::domain::BookService;
use crate::books::dto::BookDto;
use crate::catalogs::dto::CatalogDto;
use crate::core::library::LibraryResult;
use crate::core::transaction::{run_in_transaction, TransactionManager, TransactionMode};
use crate::persons::dto::PersonDto;

// TransactionalBookService runs every call of the inner service in its own
// transaction, reads in ReadOnly mode.
pub struct TransactionalBookService {
    inner: Box<dyn BookService>,
    tx_manager: Arc<dyn TransactionManager>,
}

impl TransactionalBookService {
    pub fn new(inner: Box<dyn BookService>, tx_manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            inner,
            tx_manager,
        }
    }
}

#[async_trait]
impl BookService for TransactionalBookService {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<i64> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.add_book(book)).await
    }

    async fn get_book(&self, id: i64) -> LibraryResult<BookDto> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadOnly,
                           self.inner.get_book(id)).await
    }

    async fn update_book(&self, book: &BookDto) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.update_book(book)).await
    }

    async fn delete_book(&self, id: i64) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.delete_book(id)).await
    }

    async fn add_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.add_writer(book_id, person_id)).await
    }

    async fn remove_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.remove_writer(book_id, person_id)).await
    }

    async fn add_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.add_catalog(book_id, catalog_id)).await
    }

    async fn remove_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadWrite,
                           self.inner.remove_catalog(book_id, catalog_id)).await
    }

    async fn get_all_writers(&self, book_id: i64) -> LibraryResult<Vec<PersonDto>> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadOnly,
                           self.inner.get_all_writers(book_id)).await
    }

    async fn get_all_catalogs(&self, book_id: i64) -> LibraryResult<Vec<CatalogDto>> {
        run_in_transaction(self.tx_manager.as_ref(), TransactionMode::ReadOnly,
                           self.inner.get_all_catalogs(book_id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_trait::async_trait;
    use crate::books::domain::BookService;
    use crate::books::domain::service::BookServiceImpl;
    use crate::books::domain::transactional::TransactionalBookService;
    use crate::books::dto::BookDto;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::catalogs::dto::CatalogDto;
    use crate::catalogs::repository::memory_catalog_repository::MemoryCatalogRepository;
    use crate::core::library::{LibraryError, LibraryResult};
    use crate::persons::dto::PersonDto;
    use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
    use crate::utils::memory::{MemoryDatabase, MemoryTransactionManager};

    // adds writers like the real service but fails after writing the book
    struct FailingAfterWrite {
        inner: BookServiceImpl,
    }

    #[async_trait]
    impl BookService for FailingAfterWrite {
        async fn add_book(&self, book: &BookDto) -> LibraryResult<i64> {
            let id = self.inner.add_book(book).await?;
            Err(LibraryError::runtime(format!("failed after adding {}", id).as_str(), None))
        }

        async fn get_book(&self, id: i64) -> LibraryResult<BookDto> {
            self.inner.get_book(id).await
        }

        async fn update_book(&self, book: &BookDto) -> LibraryResult<()> {
            self.inner.update_book(book).await
        }

        async fn delete_book(&self, id: i64) -> LibraryResult<()> {
            self.inner.delete_book(id).await?;
            Err(LibraryError::runtime("failed after delete", None))
        }

        async fn add_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
            self.inner.add_writer(book_id, person_id).await
        }

        async fn remove_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
            self.inner.remove_writer(book_id, person_id).await
        }

        async fn add_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
            self.inner.add_catalog(book_id, catalog_id).await
        }

        async fn remove_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
            self.inner.remove_catalog(book_id, catalog_id).await
        }

        async fn get_all_writers(&self, book_id: i64) -> LibraryResult<Vec<PersonDto>> {
            self.inner.get_all_writers(book_id).await
        }

        async fn get_all_catalogs(&self, book_id: i64) -> LibraryResult<Vec<CatalogDto>> {
            self.inner.get_all_catalogs(book_id).await
        }
    }

    fn build_inner(db: &MemoryDatabase) -> BookServiceImpl {
        BookServiceImpl::new(
            Box::new(MemoryBookRepository::new(db.clone())),
            Box::new(MemoryPersonRepository::new(db.clone())),
            Box::new(MemoryCatalogRepository::new(db.clone())))
    }

    #[tokio::test]
    async fn test_should_commit_successful_calls() {
        let db = MemoryDatabase::new();
        let book_svc = TransactionalBookService::new(
            Box::new(build_inner(&db)), Arc::new(MemoryTransactionManager::new(db.clone())));

        let id = book_svc.add_book(&BookDto::new("isbn", "test book")).await.expect("should add book");
        let loaded = book_svc.get_book(id).await.expect("should return book");
        assert_eq!("test book", loaded.title.as_str());
        assert_eq!(1, db.read(|t| t.books.len()));
    }

    #[tokio::test]
    async fn test_should_rollback_failed_calls() {
        let db = MemoryDatabase::new();
        let committed = TransactionalBookService::new(
            Box::new(build_inner(&db)), Arc::new(MemoryTransactionManager::new(db.clone())));
        let failing = TransactionalBookService::new(
            Box::new(FailingAfterWrite { inner: build_inner(&db) }),
            Arc::new(MemoryTransactionManager::new(db.clone())));

        let kept = committed.add_book(&BookDto::new("isbn1", "kept")).await.expect("should add book");
        let res = failing.add_book(&BookDto::new("isbn2", "lost")).await;
        assert!(matches!(res, Err(LibraryError::Runtime { .. })));
        assert_eq!(1, db.read(|t| t.books.len()));

        let res = failing.delete_book(kept).await;
        assert!(res.is_err());
        let loaded = committed.get_book(kept).await.expect("should still return book");
        assert_eq!("kept", loaded.title.as_str());
    }
}
