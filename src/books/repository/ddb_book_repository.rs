use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::catalogs::domain::model::CatalogEntity;
use crate::catalogs::repository::ddb_catalog_repository::DDBCatalogRepository;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::repository::ddb_person_repository::DDBPersonRepository;
use crate::utils::ddb;
use crate::utils::ddb::{BOOK_PK, parse_date_attribute, parse_number_attribute, parse_number_list_attribute, parse_opt_number_attribute, parse_string_attribute};

// DDBBookRepository stores writer and catalog ids on the book item and resolves
// them through the person and catalog tables.
#[derive(Debug, Clone)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    sequences_table: String,
    persons: DDBPersonRepository,
    catalogs: DDBCatalogRepository,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, sequences_table: &str,
                      persons: DDBPersonRepository, catalogs: DDBCatalogRepository) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            sequences_table: sequences_table.to_string(),
            persons,
            catalogs,
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn save(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        ddb::put_versioned(&self.client, self.table_name.as_str(), BOOK_PK,
                           self.sequences_table.as_str(), entity).await
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        let item = ddb::get_by_id(&self.client, self.table_name.as_str(), BOOK_PK, id).await?;
        Ok(item.as_ref().map(map_to_book))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        ddb::delete_by_id(&self.client, self.table_name.as_str(), BOOK_PK, id).await
    }
}

#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn get_writers(&self, book_id: i64) -> LibraryResult<Option<Vec<PersonEntity>>> {
        match self.find_by_id(book_id).await? {
            Some(book) => {
                let ids: Vec<i64> = book.writer_ids.into_iter().collect();
                Ok(Some(self.persons.find_by_ids(&ids).await?))
            }
            None => Ok(None),
        }
    }

    async fn get_catalogs(&self, book_id: i64) -> LibraryResult<Option<Vec<CatalogEntity>>> {
        match self.find_by_id(book_id).await? {
            Some(book) => {
                let ids: Vec<i64> = book.catalog_ids.into_iter().collect();
                Ok(Some(self.catalogs.find_by_ids(&ids).await?))
            }
            None => Ok(None),
        }
    }
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        book_id: parse_opt_number_attribute(BOOK_PK, map),
        version: parse_number_attribute("version", map),
        title: parse_string_attribute("title", map).unwrap_or(String::from("")),
        isbn: parse_string_attribute("isbn", map).unwrap_or(String::from("")),
        language: parse_string_attribute("language", map).unwrap_or(String::from("")),
        published_year: parse_opt_number_attribute("published_year", map).and_then(|y| i32::try_from(y).ok()),
        writer_ids: parse_number_list_attribute("writer_ids", map).into_iter().collect(),
        catalog_ids: parse_number_list_attribute("catalog_ids", map).into_iter().collect(),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}
