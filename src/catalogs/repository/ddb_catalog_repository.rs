use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use crate::catalogs::domain::model::CatalogEntity;
use crate::catalogs::repository::CatalogRepository;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::utils::ddb;
use crate::utils::ddb::{CATALOG_PK, parse_date_attribute, parse_number_attribute, parse_opt_number_attribute, parse_string_attribute};

#[derive(Debug, Clone)]
pub struct DDBCatalogRepository {
    client: Client,
    table_name: String,
    sequences_table: String,
    books_table: String,
}

impl DDBCatalogRepository {
    pub(crate) fn new(client: Client, table_name: &str, sequences_table: &str, books_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            sequences_table: sequences_table.to_string(),
            books_table: books_table.to_string(),
        }
    }

    pub(crate) async fn find_by_ids(&self, ids: &[i64]) -> LibraryResult<Vec<CatalogEntity>> {
        let items = ddb::batch_get_by_ids(&self.client, self.table_name.as_str(), CATALOG_PK, ids).await?;
        let mut found: Vec<CatalogEntity> = items.iter().map(map_to_catalog).collect();
        found.sort_by_key(|e| e.catalog_id);
        Ok(found)
    }
}

#[async_trait]
impl Repository<CatalogEntity> for DDBCatalogRepository {
    async fn save(&self, entity: &CatalogEntity) -> LibraryResult<CatalogEntity> {
        ddb::put_versioned(&self.client, self.table_name.as_str(), CATALOG_PK,
                           self.sequences_table.as_str(), entity).await
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<CatalogEntity>> {
        let item = ddb::get_by_id(&self.client, self.table_name.as_str(), CATALOG_PK, id).await?;
        Ok(item.as_ref().map(map_to_catalog))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        if let Some(book_id) = ddb::find_referencing_book(&self.client, self.books_table.as_str(), "catalog_ids", id).await? {
            return Err(LibraryError::still_referenced(EntityKind::Catalog, id, book_id));
        }
        ddb::delete_by_id(&self.client, self.table_name.as_str(), CATALOG_PK, id).await
    }
}

impl CatalogRepository for DDBCatalogRepository {}

fn map_to_catalog(map: &HashMap<String, AttributeValue>) -> CatalogEntity {
    CatalogEntity {
        catalog_id: parse_opt_number_attribute(CATALOG_PK, map),
        version: parse_number_attribute("version", map),
        name: parse_string_attribute("name", map).unwrap_or(String::from("")),
        description: parse_string_attribute("description", map).unwrap_or(String::from("")),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;
    use crate::catalogs::domain::model::CatalogEntity;
    use crate::catalogs::repository::ddb_catalog_repository::DDBCatalogRepository;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_library_tables};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let config = Configuration::new(RepositoryStore::LocalDynamoDB);
                let client = build_db_client(&config).await;
                create_library_tables(&client, &config).await;
                client
            });
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB local on localhost:8000"]
    async fn test_should_create_update_catalogs() {
        let catalogs_repo = DDBCatalogRepository::new(CLIENT.get().await.clone(), "catalogs", "sequences", "books");
        let mut catalog = catalogs_repo.save(&CatalogEntity::new("classics", "old books"))
            .await.expect("should create catalog");
        let stale = catalog.clone();
        catalog.description = "older books".to_string();
        let updated = catalogs_repo.save(&catalog).await.expect("should update catalog");
        assert_eq!(2, updated.version);

        let res = catalogs_repo.save(&stale).await;
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
    }
}
