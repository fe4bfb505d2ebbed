pub mod in_memory;
pub mod repository;
pub mod traits;

#[cfg(feature = "db")]
pub mod database;

pub use in_memory::InMemoryStorage;
pub use repository::{Document, Repository};
pub use traits::Storage;

#[cfg(feature = "db")]
pub use database::DatabaseStorage;
