use std::fmt;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::core::library::LibraryResult;
use crate::core::repository::StoreBackend;
use crate::utils::memory::MemoryTransactionManager;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TransactionMode {
    ReadOnly,
    ReadWrite,
}

impl Display for TransactionMode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TransactionMode::ReadOnly => write!(f, "ReadOnly"),
            TransactionMode::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

#[async_trait]
pub trait Transaction: Send {
    fn id(&self) -> &str;
    async fn commit(&mut self) -> LibraryResult<()>;
    async fn rollback(&mut self) -> LibraryResult<()>;
}

#[async_trait]
pub trait TransactionManager: Sync + Send {
    async fn begin(&self, mode: TransactionMode) -> LibraryResult<Box<dyn Transaction>>;
}

/// Runs `op` inside a transaction begun on `manager`. The transaction is committed
/// when `op` succeeds and rolled back when it fails; a failing rollback is logged
/// and the error of `op` is returned.
pub async fn run_in_transaction<T, F>(manager: &dyn TransactionManager,
                                      mode: TransactionMode, op: F) -> LibraryResult<T>
    where F: Future<Output=LibraryResult<T>> + Send {
    let mut tx = manager.begin(mode).await?;
    debug!("began {} transaction {}", mode, tx.id());
    match op.await {
        Ok(res) => {
            tx.commit().await?;
            debug!("committed transaction {}", tx.id());
            Ok(res)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("failed to rollback transaction {} due to {}", tx.id(), rollback_err);
            } else {
                debug!("rolled back transaction {} due to {}", tx.id(), err);
            }
            Err(err)
        }
    }
}

// AutoCommitTransactionManager is used by stores whose writes are atomic per record,
// every write is already durable when the store call returns.
#[derive(Debug, Default)]
pub struct AutoCommitTransactionManager {}

impl AutoCommitTransactionManager {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl TransactionManager for AutoCommitTransactionManager {
    async fn begin(&self, _mode: TransactionMode) -> LibraryResult<Box<dyn Transaction>> {
        Ok(Box::new(AutoCommitTransaction { id: Uuid::new_v4().to_string() }))
    }
}

struct AutoCommitTransaction {
    id: String,
}

#[async_trait]
impl Transaction for AutoCommitTransaction {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    async fn commit(&mut self) -> LibraryResult<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> LibraryResult<()> {
        Ok(())
    }
}

pub fn create_transaction_manager(backend: &StoreBackend) -> Arc<dyn TransactionManager> {
    match backend {
        StoreBackend::DynamoDB { .. } => {
            Arc::new(AutoCommitTransactionManager::new())
        }
        StoreBackend::Memory(db) => {
            Arc::new(MemoryTransactionManager::new(db.clone()))
        }
    }
}
