use async_trait::async_trait;
use tracing::{info, warn};
use crate::books::domain::BookService;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalogs::domain::model::CatalogEntity;
use crate::catalogs::dto::CatalogDto;
use crate::catalogs::repository::CatalogRepository;
use crate::core::library::{EntityKind, LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::dto::PersonDto;
use crate::persons::repository::PersonRepository;

pub struct BookServiceImpl {
    book_repository: Box<dyn BookRepository>,
    person_repository: Box<dyn PersonRepository>,
    catalog_repository: Box<dyn CatalogRepository>,
}

impl BookServiceImpl {
    pub fn new(book_repository: Box<dyn BookRepository>,
               person_repository: Box<dyn PersonRepository>,
               catalog_repository: Box<dyn CatalogRepository>) -> Self {
        Self {
            book_repository,
            person_repository,
            catalog_repository,
        }
    }

    async fn load_book(&self, id: i64) -> LibraryResult<BookEntity> {
        self.book_repository.find_by_id(id).await?
            .ok_or_else(|| LibraryError::entity_not_found(EntityKind::Book, id))
    }

    async fn load_person(&self, id: i64) -> LibraryResult<PersonEntity> {
        self.person_repository.find_by_id(id).await?
            .ok_or_else(|| LibraryError::entity_not_found(EntityKind::Person, id))
    }

    async fn load_catalog(&self, id: i64) -> LibraryResult<CatalogEntity> {
        self.catalog_repository.find_by_id(id).await?
            .ok_or_else(|| LibraryError::entity_not_found(EntityKind::Catalog, id))
    }
}

#[async_trait]
impl BookService for BookServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<i64> {
        let mut entity = BookEntity::from(book);
        entity.book_id = None;
        entity.version = 0;
        // writers and catalogs are only associated through add_writer and add_catalog
        entity.writer_ids.clear();
        entity.catalog_ids.clear();
        let saved = self.book_repository.save(&entity).await?;
        info!("added book {:?}", saved);
        saved.book_id.ok_or_else(|| LibraryError::runtime(
            format!("store returned book {} without id", saved.isbn).as_str(), None))
    }

    async fn get_book(&self, id: i64) -> LibraryResult<BookDto> {
        let book = self.load_book(id).await?;
        info!("fetched book {:?}", book);
        Ok(BookDto::from(&book))
    }

    // updates the book fields, writer and catalog associations stay as stored
    async fn update_book(&self, book: &BookDto) -> LibraryResult<()> {
        let mut entity = BookEntity::from(book);
        let stored = match entity.book_id {
            Some(id) => self.book_repository.find_by_id(id).await?,
            None => None,
        };
        match stored {
            Some(stored) => {
                entity.writer_ids = stored.writer_ids;
                entity.catalog_ids = stored.catalog_ids;
            }
            None => {
                entity.writer_ids.clear();
                entity.catalog_ids.clear();
            }
        }
        let saved = self.book_repository.save(&entity).await?;
        info!("updated book {:?}", saved);
        Ok(())
    }

    // writer and catalog memberships live on the book record and go with it
    async fn delete_book(&self, id: i64) -> LibraryResult<()> {
        let book = self.load_book(id).await?;
        self.book_repository.delete_by_id(id).await?;
        info!("deleted book by id {} with {} writers and {} catalogs",
              id, book.writer_ids.len(), book.catalog_ids.len());
        Ok(())
    }

    async fn add_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
        let mut book = self.load_book(book_id).await?;
        if book.has_writer(person_id) {
            warn!("book by id {} has writer by person id {}", book_id, person_id);
            return Ok(());
        }
        let person = self.load_person(person_id).await?;
        book.writer_ids.insert(person_id);
        self.book_repository.save(&book).await?;
        info!("added writer {} {} to book {}", person.first_name, person.last_name, book_id);
        Ok(())
    }

    async fn remove_writer(&self, book_id: i64, person_id: i64) -> LibraryResult<()> {
        let mut book = self.load_book(book_id).await?;
        let _ = self.load_person(person_id).await?;
        if book.writer_ids.remove(&person_id) {
            self.book_repository.save(&book).await?;
            info!("removed writer {} from book {}", person_id, book_id);
        }
        Ok(())
    }

    async fn add_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
        let mut book = self.load_book(book_id).await?;
        if book.has_catalog(catalog_id) {
            warn!("book by id {} has catalog by id {}", book_id, catalog_id);
            return Ok(());
        }
        let catalog = self.load_catalog(catalog_id).await?;
        book.catalog_ids.insert(catalog_id);
        self.book_repository.save(&book).await?;
        info!("added book {} to catalog {}", book_id, catalog.name);
        Ok(())
    }

    async fn remove_catalog(&self, book_id: i64, catalog_id: i64) -> LibraryResult<()> {
        let mut book = self.load_book(book_id).await?;
        let _ = self.load_catalog(catalog_id).await?;
        if book.catalog_ids.remove(&catalog_id) {
            self.book_repository.save(&book).await?;
            info!("removed book {} from catalog {}", book_id, catalog_id);
        }
        Ok(())
    }

    async fn get_all_writers(&self, book_id: i64) -> LibraryResult<Vec<PersonDto>> {
        let _ = self.load_book(book_id).await?;
        let writers = self.book_repository.get_writers(book_id).await?
            .ok_or_else(|| LibraryError::entity_not_found(EntityKind::Book, book_id))?;
        Ok(writers.iter().map(PersonDto::from).collect())
    }

    async fn get_all_catalogs(&self, book_id: i64) -> LibraryResult<Vec<CatalogDto>> {
        let _ = self.load_book(book_id).await?;
        let catalogs = self.book_repository.get_catalogs(book_id).await?
            .ok_or_else(|| LibraryError::entity_not_found(EntityKind::Book, book_id))?;
        Ok(catalogs.iter().map(CatalogDto::from).collect())
    }
}
