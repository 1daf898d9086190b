use std::io;

use thiserror::Error;

use crate::article::{ArticleId, ValidationError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("There is no article with id \"{0}\"")]
    NotFound(ArticleId),

    #[error("Article rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Error reading seed file")]
    SeedIo(#[from] io::Error),

    #[error("Error decoding seed file")]
    SeedFormat(#[from] serde_json::Error),
}
