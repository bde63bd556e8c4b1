pub mod book;

pub use book::{Book, BookChanges, NewBook};
