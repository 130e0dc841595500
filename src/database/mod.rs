pub mod collection;
pub mod document;
pub mod manager;

pub use collection::Collection;
pub use document::{DeleteResult, Document, InsertOneResult, UpdateResult};
pub use manager::{Database, DatabaseError};
