use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::repository::PersonRepository;
use crate::utils::ddb;
use crate::utils::ddb::{parse_date_attribute, parse_number_attribute, parse_opt_number_attribute, parse_string_attribute, PERSON_PK};

#[derive(Debug, Clone)]
pub struct DDBPersonRepository {
    client: Client,
    table_name: String,
    sequences_table: String,
    books_table: String,
}

impl DDBPersonRepository {
    pub(crate) fn new(client: Client, table_name: &str, sequences_table: &str, books_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            sequences_table: sequences_table.to_string(),
            books_table: books_table.to_string(),
        }
    }

    pub(crate) async fn find_by_ids(&self, ids: &[i64]) -> LibraryResult<Vec<PersonEntity>> {
        let items = ddb::batch_get_by_ids(&self.client, self.table_name.as_str(), PERSON_PK, ids).await?;
        let mut found: Vec<PersonEntity> = items.iter().map(map_to_person).collect();
        found.sort_by_key(|e| e.person_id);
        Ok(found)
    }
}

#[async_trait]
impl Repository<PersonEntity> for DDBPersonRepository {
    async fn save(&self, entity: &PersonEntity) -> LibraryResult<PersonEntity> {
        ddb::put_versioned(&self.client, self.table_name.as_str(), PERSON_PK,
                           self.sequences_table.as_str(), entity).await
    }

    async fn find_by_id(&self, id: i64) -> LibraryResult<Option<PersonEntity>> {
        let item = ddb::get_by_id(&self.client, self.table_name.as_str(), PERSON_PK, id).await?;
        Ok(item.as_ref().map(map_to_person))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<usize> {
        if let Some(book_id) = ddb::find_referencing_book(&self.client, self.books_table.as_str(), "writer_ids", id).await? {
            return Err(LibraryError::still_referenced(EntityKind::Person, id, book_id));
        }
        ddb::delete_by_id(&self.client, self.table_name.as_str(), PERSON_PK, id).await
    }
}

impl PersonRepository for DDBPersonRepository {}

fn map_to_person(map: &HashMap<String, AttributeValue>) -> PersonEntity {
    PersonEntity {
        person_id: parse_opt_number_attribute(PERSON_PK, map),
        version: parse_number_attribute("version", map),
        first_name: parse_string_attribute("first_name", map).unwrap_or(String::from("")),
        last_name: parse_string_attribute("last_name", map).unwrap_or(String::from("")),
        email: parse_string_attribute("email", map).unwrap_or(String::from("")),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}
