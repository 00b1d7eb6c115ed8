use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::utils::date::serializer;

// BookDto is a data transfer object for the book service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub book_id: Option<i64>,
    pub version: i64,
    pub title: String,
    pub isbn: String,
    pub language: String,
    pub published_year: Option<i32>,
    pub writer_ids: Vec<i64>,
    pub catalog_ids: Vec<i64>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookDto {
    pub fn new(isbn: &str, title: &str) -> BookDto {
        BookDto {
            book_id: None,
            version: 0,
            title: title.to_string(),
            isbn: isbn.to_string(),
            language: "en".to_string(),
            published_year: None,
            writer_ids: vec![],
            catalog_ids: vec![],
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            isbn: other.isbn.to_string(),
            language: other.language.to_string(),
            published_year: other.published_year,
            writer_ids: other.writer_ids.iter().copied().collect(),
            catalog_ids: other.catalog_ids.iter().copied().collect(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            isbn: other.isbn.to_string(),
            language: other.language.to_string(),
            published_year: other.published_year,
            writer_ids: other.writer_ids.iter().copied().collect(),
            catalog_ids: other.catalog_ids.iter().copied().collect(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("isbn", "title");
        assert_eq!("isbn", book.isbn.as_str());
        assert_eq!("title", book.title.as_str());
        assert_eq!("en", book.language.as_str());
    }

    #[tokio::test]
    async fn test_should_dedupe_ids_when_converting() {
        let mut book = BookDto::new("isbn", "title");
        book.writer_ids = vec![4, 2, 4];
        let entity = BookEntity::from(&book);
        assert_eq!(2, entity.writer_ids.len());
        assert_eq!(vec![2, 4], BookDto::from(&entity).writer_ids);
    }
}
