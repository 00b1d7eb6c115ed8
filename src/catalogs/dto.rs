use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::catalogs::domain::model::CatalogEntity;
use crate::utils::date::serializer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDto {
    pub catalog_id: Option<i64>,
    pub version: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl From<&CatalogEntity> for CatalogDto {
    fn from(other: &CatalogEntity) -> Self {
        Self {
            catalog_id: other.catalog_id,
            version: other.version,
            name: other.name.to_string(),
            description: other.description.to_string(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
