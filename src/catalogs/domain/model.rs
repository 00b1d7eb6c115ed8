use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::EntityKind;
use crate::utils::date::serializer;

// CatalogEntity is a named collection that books can be listed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub catalog_id: Option<i64>,
    pub version: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl CatalogEntity {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            catalog_id: None,
            version: 0,
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for CatalogEntity {
    const KIND: EntityKind = EntityKind::Catalog;

    fn id(&self) -> Option<i64> {
        self.catalog_id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn assign(&mut self, id: i64, version: i64, updated_at: NaiveDateTime) {
        self.catalog_id = Some(id);
        self.version = version;
        self.updated_at = updated_at;
    }
}
