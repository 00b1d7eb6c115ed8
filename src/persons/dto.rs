use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::persons::domain::model::PersonEntity;
use crate::utils::date::serializer;

// PersonDto is returned when listing the writers of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDto {
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

impl From<&PersonEntity> for PersonDto {
    fn from(other: &PersonEntity) -> Self {
        Self {
            person_id: other.person_id,
            version: other.version,
            first_name: other.first_name.to_string(),
            last_name: other.last_name.to_string(),
            email: other.email.to_string(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
