use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("storage read error: {0}")]
    StorageRead(String),
    #[error("storage write error: {0}")]
    StorageWrite(String),
    #[error("image not found: {0}")]
    ImageNotFound(String),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
}

impl CatalogueError {
    pub fn storage_read(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::StorageRead(format!("{context}: {err}"))
    }

    pub fn storage_write(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::StorageWrite(format!("{context}: {err}"))
    }
}
