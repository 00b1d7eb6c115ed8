use std::fmt;
use std::fmt::{Display, Formatter};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use serde::{Deserialize, Serialize};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::ddb::{build_db_client, create_library_tables};
use crate::utils::memory::MemoryDatabase;

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // inserts the entity when its version is 0 and its id is unset or free, otherwise
    // replaces the stored record only if the versions match. Returns the entity as stored.
    async fn save(&self, entity: &Entity) -> LibraryResult<Entity>;

    // get an entity
    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<Entity>>;

    // delete an entity, returns number of removed records
    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    Memory,
}

impl TryFrom<&str> for RepositoryStore {
    type Error = LibraryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(RepositoryStore::DynamoDB),
            "local" | "localdynamodb" => Ok(RepositoryStore::LocalDynamoDB),
            "memory" => Ok(RepositoryStore::Memory),
            other => Err(LibraryError::validation(
                format!("unknown repository store {}", other).as_str(), None)),
        }
    }
}

impl Display for RepositoryStore {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RepositoryStore::DynamoDB => write!(f, "dynamodb"),
            RepositoryStore::LocalDynamoDB => write!(f, "local"),
            RepositoryStore::Memory => write!(f, "memory"),
        }
    }
}

// StoreBackend is the connected storage shared by all repositories of one service
#[derive(Debug, Clone)]
pub enum StoreBackend {
    DynamoDB {
        client: Client,
        config: Configuration,
    },
    Memory(MemoryDatabase),
}

impl StoreBackend {
    pub async fn connect(config: &Configuration) -> LibraryResult<StoreBackend> {
        match config.store {
            RepositoryStore::DynamoDB => {
                let client = build_db_client(config).await;
                Ok(StoreBackend::DynamoDB { client, config: config.clone() })
            }
            RepositoryStore::LocalDynamoDB => {
                let client = build_db_client(config).await;
                create_library_tables(&client, config).await;
                Ok(StoreBackend::DynamoDB { client, config: config.clone() })
            }
            RepositoryStore::Memory => {
                Ok(StoreBackend::Memory(MemoryDatabase::new()))
            }
        }
    }

    pub fn memory() -> StoreBackend {
        StoreBackend::Memory(MemoryDatabase::new())
    }
}
