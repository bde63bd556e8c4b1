pub mod book_service;

pub use book_service::{BookAccessError, BookService};
