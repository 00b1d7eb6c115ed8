use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::warn;
use uuid::Uuid;
use crate::books::domain::model::BookEntity;
use crate::catalogs::domain::model::CatalogEntity;
use crate::core::domain::Identifiable;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::transaction::{Transaction, TransactionManager, TransactionMode};
use crate::persons::domain::model::PersonEntity;

// Tables holds every record of the in-process store, it is cloned as a whole
// to snapshot a transaction.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) books: BTreeMap<i64, BookEntity>,
    pub(crate) persons: BTreeMap<i64, PersonEntity>,
    pub(crate) catalogs: BTreeMap<i64, CatalogEntity>,
    pub(crate) sequences: HashMap<EntityKind, i64>,
}

// MemoryDatabase is a handle on the shared tables. Gated handles wait for the
// running transaction before every repository call; the handles a transactional
// service runs on are ungated since the transaction already holds the gate.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    // held for the lifetime of a transaction
    gate: Arc<tokio::sync::Mutex<()>>,
    gated: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(&self) -> Self {
        Self { gated: true, ..self.clone() }
    }

    pub fn ungated(&self) -> Self {
        Self { gated: false, ..self.clone() }
    }

    pub(crate) async fn enter(&self) -> Option<OwnedMutexGuard<()>> {
        if self.gated {
            Some(self.gate.clone().lock_owned().await)
        } else {
            None
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.lock();
        f(&tables)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock();
        f(&mut tables)
    }

    fn snapshot(&self) -> Tables {
        self.tables.lock().clone()
    }

    fn restore(&self, snapshot: Tables) {
        *self.tables.lock() = snapshot;
    }
}

// Writes entity into table: an entity without id gets the next sequence value. An
// entity at version 0 is inserted and must not exist yet, any other entity must
// match the stored version, so a deleted record is never written back.
pub(crate) fn upsert<E>(table: &mut BTreeMap<i64, E>, sequences: &mut HashMap<EntityKind, i64>,
                        entity: &E) -> LibraryResult<E>
    where E: Identifiable + Clone {
    let sequence = sequences.entry(E::KIND).or_insert(0);
    let id = match entity.id() {
        Some(id) => {
            let stored_version = table.get(&id).map(|existing| existing.version()).unwrap_or(0);
            if stored_version != entity.version() {
                return Err(LibraryError::stale_version(E::KIND, id, entity.version()));
            }
            if id > *sequence {
                *sequence = id;
            }
            id
        }
        None => {
            *sequence += 1;
            *sequence
        }
    };
    let mut stored = entity.clone();
    stored.assign(id, entity.version() + 1, Utc::now().naive_utc());
    table.insert(id, stored.clone());
    Ok(stored)
}

#[derive(Debug)]
pub struct MemoryTransactionManager {
    db: MemoryDatabase,
}

impl MemoryTransactionManager {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for MemoryTransactionManager {
    async fn begin(&self, mode: TransactionMode) -> LibraryResult<Box<dyn Transaction>> {
        let guard = self.db.gate.clone().lock_owned().await;
        let snapshot = match mode {
            TransactionMode::ReadOnly => None,
            TransactionMode::ReadWrite => Some(self.db.snapshot()),
        };
        Ok(Box::new(MemoryTransaction {
            id: Uuid::new_v4().to_string(),
            db: self.db.clone(),
            snapshot,
            _guard: guard,
        }))
    }
}

struct MemoryTransaction {
    id: String,
    db: MemoryDatabase,
    snapshot: Option<Tables>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    async fn commit(&mut self) -> LibraryResult<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(&mut self) -> LibraryResult<()> {
        if let Some(snapshot) = self.snapshot.take() {
            self.db.restore(snapshot);
        }
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            warn!("transaction {} dropped before commit, restoring snapshot", self.id);
            self.db.restore(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::core::library::{EntityKind, LibraryError};
    use crate::core::transaction::{TransactionManager, TransactionMode};
    use crate::core::repository::Repository;
    use crate::persons::domain::model::PersonEntity;
    use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
    use crate::utils::memory::{MemoryDatabase, MemoryTransactionManager, upsert};

    fn save_person(db: &MemoryDatabase, person: &PersonEntity) -> Result<PersonEntity, LibraryError> {
        db.write(|t| upsert(&mut t.persons, &mut t.sequences, person))
    }

    #[tokio::test]
    async fn test_should_assign_ids_and_versions() {
        let db = MemoryDatabase::new();
        let first = save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        let second = save_person(&db, &PersonEntity::new("Alan", "Turing", "alan@org.cc")).expect("should save");
        assert_eq!(Some(1), first.person_id);
        assert_eq!(Some(2), second.person_id);
        assert_eq!(1, first.version);
        assert_eq!(Some(2), db.read(|t| t.sequences.get(&EntityKind::Person).copied()));
    }

    #[tokio::test]
    async fn test_should_reject_stale_version() {
        let db = MemoryDatabase::new();
        let saved = save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        let updated = save_person(&db, &saved).expect("should update");
        assert_eq!(2, updated.version);
        let res = save_person(&db, &saved);
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_should_insert_unknown_id() {
        let db = MemoryDatabase::new();
        let mut person = PersonEntity::new("Ada", "Lovelace", "ada@org.cc");
        person.person_id = Some(10);
        let saved = save_person(&db, &person).expect("should insert");
        assert_eq!(Some(10), saved.person_id);
        let next = save_person(&db, &PersonEntity::new("Alan", "Turing", "alan@org.cc")).expect("should save");
        assert_eq!(Some(11), next.person_id);
    }

    #[tokio::test]
    async fn test_should_not_write_back_deleted_record() {
        let db = MemoryDatabase::new();
        let saved = save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        db.write(|t| t.persons.clear());
        let res = save_person(&db, &saved);
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
        assert_eq!(0, db.read(|t| t.persons.len()));
    }

    // writes made through the transaction's own handle are undone
    #[tokio::test]
    async fn test_should_rollback_to_snapshot() {
        let db = MemoryDatabase::new();
        let manager = MemoryTransactionManager::new(db.clone());
        let mut tx = manager.begin(TransactionMode::ReadWrite).await.expect("should begin");
        save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        assert_eq!(1, db.read(|t| t.persons.len()));
        tx.rollback().await.expect("should rollback");
        assert_eq!(0, db.read(|t| t.persons.len()));
    }

    #[tokio::test]
    async fn test_should_keep_gated_writes_across_rollback() {
        let db = MemoryDatabase::new();
        let manager = MemoryTransactionManager::new(db.clone());
        let mut tx = manager.begin(TransactionMode::ReadWrite).await.expect("should begin");
        save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");

        let persons_repo = MemoryPersonRepository::new(db.gated());
        let pending = tokio::spawn(async move {
            persons_repo.save(&PersonEntity::new("Alan", "Turing", "alan@org.cc")).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(1, db.read(|t| t.persons.len()));

        tx.rollback().await.expect("should rollback");
        drop(tx);
        let saved = pending.await.expect("should join").expect("should save");
        assert_eq!("Alan", saved.first_name.as_str());
        let names: Vec<String> = db.read(|t| t.persons.values().map(|p| p.first_name.clone()).collect());
        assert_eq!(vec!["Alan".to_string()], names);
    }

    #[tokio::test]
    async fn test_should_restore_snapshot_on_drop() {
        let db = MemoryDatabase::new();
        let manager = MemoryTransactionManager::new(db.clone());
        {
            let _tx = manager.begin(TransactionMode::ReadWrite).await.expect("should begin");
            save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        }
        assert_eq!(0, db.read(|t| t.persons.len()));
    }

    #[tokio::test]
    async fn test_should_keep_committed_writes() {
        let db = MemoryDatabase::new();
        let manager = MemoryTransactionManager::new(db.clone());
        let mut tx = manager.begin(TransactionMode::ReadWrite).await.expect("should begin");
        save_person(&db, &PersonEntity::new("Ada", "Lovelace", "ada@org.cc")).expect("should save");
        tx.commit().await.expect("should commit");
        drop(tx);
        assert_eq!(1, db.read(|t| t.persons.len()));
    }

    #[tokio::test]
    async fn test_should_serialize_transactions() {
        let db = MemoryDatabase::new();
        let manager = MemoryTransactionManager::new(db.clone());
        let mut first = manager.begin(TransactionMode::ReadOnly).await.expect("should begin");
        let blocked = tokio::time::timeout(Duration::from_millis(50),
                                           manager.begin(TransactionMode::ReadOnly)).await;
        assert!(blocked.is_err());
        first.commit().await.expect("should commit");
        drop(first);
        let _second = manager.begin(TransactionMode::ReadOnly).await.expect("should begin");
    }
}
