use async_trait::async_trait;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::repository::PersonRepository;
use crate::utils::memory::{MemoryDatabase, upsert};

#[derive(Debug, Clone)]
pub struct MemoryPersonRepository {
    db: MemoryDatabase,
}

impl MemoryPersonRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<PersonEntity> for MemoryPersonRepository {
    async fn save(&self, entity: &PersonEntity) -> LibraryResult<PersonEntity> {
        let _guard = self.db.enter().await;
        self.db.write(|t| upsert(&mut t.persons, &mut t.sequences, entity))
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<PersonEntity>> {
        let _guard = self.db.enter().await;
        Ok(self.db.read(|t| t.persons.get(&id).cloned()))
    }

    // a person still listed as writer of a book is kept
    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        let _guard = self.db.enter().await;
        self.db.write(|t| {
            if let Some(book_id) = t.books.values().find(|b| b.has_writer(id)).and_then(|b| b.book_id) {
                return Err(LibraryError::still_referenced(EntityKind::Person, id, book_id));
            }
            Ok(t.persons.remove(&id).map_or(0, |_| 1))
        })
    }
}

impl PersonRepository for MemoryPersonRepository {}
