use crate::{api::StoreError, cache::CacheError, forms::ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),

    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
