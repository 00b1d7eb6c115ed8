use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::library::{EntityKind, LibraryResult};
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    const KIND: EntityKind;

    // id is None until the store assigns one
    fn id(&self) -> Option<i64>;
    fn version(&self) -> i64;

    // called by stores when the entity is written
    fn assign(&mut self, id: i64, version: i64, updated_at: NaiveDateTime);
}

pub const ENV_STORE: &str = "LIBRARY_STORE";
pub const ENV_TABLE_PREFIX: &str = "LIBRARY_TABLE_PREFIX";
pub const ENV_DYNAMODB_ENDPOINT: &str = "DYNAMODB_ENDPOINT";

const DEFAULT_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

// Configuration abstracts config options for the catalog services
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub store: RepositoryStore,
    pub table_prefix: String,
    pub dynamodb_endpoint: String,
}

impl Configuration {
    pub fn new(store: RepositoryStore) -> Self {
        Configuration {
            store,
            table_prefix: "".to_string(),
            dynamodb_endpoint: DEFAULT_DYNAMODB_ENDPOINT.to_string(),
        }
    }

    pub fn from_env() -> LibraryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // builds configuration from a variable lookup, unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> LibraryResult<Self>
        where F: Fn(&str) -> Option<String> {
        let store = match lookup(ENV_STORE) {
            Some(val) => RepositoryStore::try_from(val.as_str())?,
            None => RepositoryStore::Memory,
        };
        let mut config = Configuration::new(store);
        if let Some(prefix) = lookup(ENV_TABLE_PREFIX) {
            config.table_prefix = prefix;
        }
        if let Some(endpoint) = lookup(ENV_DYNAMODB_ENDPOINT) {
            config.dynamodb_endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn table_name(&self, base: &str) -> String {
        format!("{}{}", self.table_prefix, base)
    }
}
