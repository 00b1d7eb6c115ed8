pub mod ddb_catalog_repository;
pub mod memory_catalog_repository;

use crate::catalogs::domain::model::CatalogEntity;
use crate::core::repository::Repository;

pub trait CatalogRepository: Repository<CatalogEntity> {}
