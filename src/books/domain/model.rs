use std::collections::BTreeSet;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::EntityKind;
use crate::utils::date::serializer;

// BookEntity abstracts a catalogued title. The book record owns its writer and
// catalog memberships, so dropping the record drops its associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    pub book_id: Option<i64>,
    pub version: i64,
    pub title: String,
    pub isbn: String,
    pub language: String,
    pub published_year: Option<i32>,
    pub writer_ids: BTreeSet<i64>,
    pub catalog_ids: BTreeSet<i64>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str) -> Self {
        Self {
            book_id: None,
            version: 0,
            title: title.to_string(),
            isbn: isbn.to_string(),
            language: "en".to_string(),
            published_year: None,
            writer_ids: BTreeSet::new(),
            catalog_ids: BTreeSet::new(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn has_writer(&self, person_id: i64) -> bool {
        self.writer_ids.contains(&person_id)
    }

    pub fn has_catalog(&self, catalog_id: i64) -> bool {
        self.catalog_ids.contains(&catalog_id)
    }
}

impl Identifiable for BookEntity {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> Option<i64> {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn assign(&mut self, id: i64, version: i64, updated_at: NaiveDateTime) {
        self.book_id = Some(id);
        self.version = version;
        self.updated_at = updated_at;
    }
}
