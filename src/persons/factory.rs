use aws_sdk_dynamodb::Client;
use crate::core::domain::Configuration;
use crate::core::repository::StoreBackend;
use crate::persons::repository::ddb_person_repository::DDBPersonRepository;
use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
use crate::persons::repository::PersonRepository;
use crate::utils::ddb::{BOOKS_TABLE, PERSONS_TABLE, SEQUENCES_TABLE};

pub fn create_person_repository(backend: &StoreBackend) -> Box<dyn PersonRepository> {
    match backend {
        StoreBackend::DynamoDB { client, config } => {
            Box::new(create_ddb_person_repository(client, config))
        }
        StoreBackend::Memory(db) => {
            Box::new(MemoryPersonRepository::new(db.gated()))
        }
    }
}

pub(crate) fn create_ddb_person_repository(client: &Client, config: &Configuration) -> DDBPersonRepository {
    DDBPersonRepository::new(client.clone(),
                             config.table_name(PERSONS_TABLE).as_str(),
                             config.table_name(SEQUENCES_TABLE).as_str(),
                             config.table_name(BOOKS_TABLE).as_str())
}
