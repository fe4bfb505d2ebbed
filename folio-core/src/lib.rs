pub mod common;
pub mod content;
pub mod domain;
pub mod markdown;
pub mod storage;
pub mod validation;

#[cfg(feature = "db")]
pub mod database;

pub use common::error::{FolioError, Result};
pub use domain::*;

// Re-export database manager when db feature is enabled
#[cfg(feature = "db")]
pub use database::DatabaseManager;
