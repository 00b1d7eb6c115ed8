use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::catalogs::domain::model::CatalogEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::utils::memory::{MemoryDatabase, upsert};

#[derive(Debug, Clone)]
pub struct MemoryBookRepository {
    db: MemoryDatabase,
}

impl MemoryBookRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn save(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        let _guard = self.db.enter().await;
        self.db.write(|t| upsert(&mut t.books, &mut t.sequences, entity))
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        let _guard = self.db.enter().await;
        Ok(self.db.read(|t| t.books.get(&id).cloned()))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        let _guard = self.db.enter().await;
        Ok(self.db.write(|t| t.books.remove(&id).map_or(0, |_| 1)))
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    // ids without a stored person are skipped
    async fn get_writers(&self, book_id: i64) -> LibraryResult<Option<Vec<PersonEntity>>> {
        let _guard = self.db.enter().await;
        Ok(self.db.read(|t| {
            t.books.get(&book_id).map(|book| {
                book.writer_ids.iter().filter_map(|id| t.persons.get(id).cloned()).collect()
            })
        }))
    }

    async fn get_catalogs(&self, book_id: i64) -> LibraryResult<Option<Vec<CatalogEntity>>> {
        let _guard = self.db.enter().await;
        Ok(self.db.read(|t| {
            t.books.get(&book_id).map(|book| {
                book.catalog_ids.iter().filter_map(|id| t.catalogs.get(id).cloned()).collect()
            })
        }))
    }
}
