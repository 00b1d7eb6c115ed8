use aws_sdk_dynamodb::Client;
use crate::catalogs::repository::CatalogRepository;
use crate::catalogs::repository::ddb_catalog_repository::DDBCatalogRepository;
use crate::catalogs::repository::memory_catalog_repository::MemoryCatalogRepository;
use crate::core::domain::Configuration;
use crate::core::repository::StoreBackend;
use crate::utils::ddb::{BOOKS_TABLE, CATALOGS_TABLE, SEQUENCES_TABLE};

pub fn create_catalog_repository(backend: &StoreBackend) -> Box<dyn CatalogRepository> {
    match backend {
        StoreBackend::DynamoDB { client, config } => {
            Box::new(create_ddb_catalog_repository(client, config))
        }
        StoreBackend::Memory(db) => {
            Box::new(MemoryCatalogRepository::new(db.gated()))
        }
    }
}

pub(crate) fn create_ddb_catalog_repository(client: &Client, config: &Configuration) -> DDBCatalogRepository {
    DDBCatalogRepository::new(client.clone(),
                              config.table_name(CATALOGS_TABLE).as_str(),
                              config.table_name(SEQUENCES_TABLE).as_str(),
                              config.table_name(BOOKS_TABLE).as_str())
}
