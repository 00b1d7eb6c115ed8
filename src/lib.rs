pub mod books;
pub mod catalogs;
pub mod core;
pub mod persons;
pub mod utils;
