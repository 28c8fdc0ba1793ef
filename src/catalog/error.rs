use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{field} must be between {min} and {max} characters long (got {len})")]
    Validation {
        field: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },

    #[error("no package found matching '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
