pub mod ddb_person_repository;
pub mod memory_person_repository;

use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;

pub trait PersonRepository: Repository<PersonEntity> {}
