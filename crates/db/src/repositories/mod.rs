use thiserror::Error;

use petsit_core::StoreError;

pub mod category;
pub mod listing;
pub mod memory;
pub mod session;

pub use category::SqlCategoryDirectory;
pub use listing::SqlListingRepository;
pub use memory::{InMemoryCategoryDirectory, InMemoryListings, InMemorySessionStore};
pub use session::SqlSessionStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        StoreError::Unavailable(error.to_string())
    }
}
