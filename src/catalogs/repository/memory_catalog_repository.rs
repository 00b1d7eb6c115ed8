use async_trait::async_trait;
use crate::catalogs::domain::model::CatalogEntity;
use crate::catalogs::repository::CatalogRepository;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::utils::memory::{MemoryDatabase, upsert};

#[derive(Debug, Clone)]
pub struct MemoryCatalogRepository {
    db: MemoryDatabase,
}

impl MemoryCatalogRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<CatalogEntity> for MemoryCatalogRepository {
    async fn save(&self, entity: &CatalogEntity) -> LibraryResult<CatalogEntity> {
        let _guard = self.db.enter().await;
        self.db.write(|t| upsert(&mut t.catalogs, &mut t.sequences, entity))
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<CatalogEntity>> {
        let _guard = self.db.enter().await;
        Ok(self.db.read(|t| t.catalogs.get(&id).cloned()))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        let _guard = self.db.enter().await;
        self.db.write(|t| {
            if let Some(book_id) = t.books.values().find(|b| b.has_catalog(id)).and_then(|b| b.book_id) {
                return Err(LibraryError::still_referenced(EntityKind::Catalog, id, book_id));
            }
            Ok(t.catalogs.remove(&id).map_or(0, |_| 1))
        })
    }
}

impl CatalogRepository for MemoryCatalogRepository {}
