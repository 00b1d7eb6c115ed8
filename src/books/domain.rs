pub mod model;
pub mod service;
pub mod transactional;

use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::catalogs::dto::CatalogDto;
use crate::core::library::LibraryResult;
use crate::persons::dto::PersonDto;

#[async_trait]
pub trait BookService: Sync + Send {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<i64>;
    async fn get_book(&self, id: i64) -> LibraryResult<BookDto>;
    async fn update_book(&self, book: &BookDto) -> LibraryResult<()>;
    async fn delete_book(&self, id: i64) -> LibraryResult<()>;
    async fn add_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()>;
    async fn remove_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()>;
    async fn add_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()>;
    async fn remove_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()>;
    async fn get_all_writers(&self, book_id: i64) -> LibraryResult<Vec<PersonDto>>;
    async fn get_all_catalogs(&self, book_id: i64) -> LibraryResult<Vec<CatalogDto>>;
}
