pub mod ddb_book_repository;
pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::catalogs::domain::model::CatalogEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;

#[async_trait]
pub trait BookRepository: Repository<BookEntity> {
    // writers of the book, None when the book does not exist
    async fn get_writers(&self, book_id: i64) -> LibraryResult<Option<Vec<PersonEntity>>>;

    // catalogs listing the book, None when the book does not exist
    async fn get_catalogs(&self, book_id: i64) -> LibraryResult<Option<Vec<CatalogEntity>>>;
}
