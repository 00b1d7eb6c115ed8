use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::EntityKind;
use crate::utils::date::serializer;

// PersonEntity abstracts a person who can be credited as a writer of books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonEntity {
    pub person_id: Option<i64>,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PersonEntity {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            person_id: None,
            version: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for PersonEntity {
    const KIND: EntityKind = EntityKind::Person;

    fn id(&self) -> Option<i64> {
        self.person_id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn assign(&mut self, id: i64, version: i64, updated_at: NaiveDateTime) {
        self.person_id = Some(id);
        self.version = version;
        self.updated_at = updated_at;
    }
}
