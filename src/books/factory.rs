use crate::books::domain::BookService;
use crate::books::domain::service::BookServiceImpl;
use crate::books::domain::transactional::TransactionalBookService;
use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::catalogs::factory::{create_catalog_repository, create_ddb_catalog_repository};
use crate::catalogs::repository::memory_catalog_repository::MemoryCatalogRepository;
use crate::core::repository::StoreBackend;
use crate::core::transaction::create_transaction_manager;
use crate::persons::factory::{create_ddb_person_repository, create_person_repository};
use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
use crate::utils::ddb::{BOOKS_TABLE, SEQUENCES_TABLE};

pub fn create_book_repository(backend: &StoreBackend) -> Box<dyn BookRepository> {
    match backend {
        StoreBackend::DynamoDB { client, config } => {
            Box::new(DDBBookRepository::new(client.clone(),
                                            config.table_name(BOOKS_TABLE).as_str(),
                                            config.table_name(SEQUENCES_TABLE).as_str(),
                                            create_ddb_person_repository(client, config),
                                            create_ddb_catalog_repository(client, config)))
        }
        StoreBackend::Memory(db) => {
            Box::new(MemoryBookRepository::new(db.gated()))
        }
    }
}

// builds the book service over the backend with every call wrapped in a transaction
pub fn create_book_service(backend: &StoreBackend) -> Box<dyn BookService> {
    let svc = match backend {
        StoreBackend::DynamoDB { .. } => {
            BookServiceImpl::new(create_book_repository(backend),
                                 create_person_repository(backend),
                                 create_catalog_repository(backend))
        }
        // the transaction holds the gate for the whole call
        StoreBackend::Memory(db) => {
            BookServiceImpl::new(Box::new(MemoryBookRepository::new(db.ungated())),
                                 Box::new(MemoryPersonRepository::new(db.ungated())),
                                 Box::new(MemoryCatalogRepository::new(db.ungated())))
        }
    };
    Box::new(TransactionalBookService::new(Box::new(svc), create_transaction_manager(backend)))
}
