//! Catalog error types.

use thiserror::Error;

/// Errors from loading or querying the instance catalog.
///
/// A lookup that finds nothing is not an error — see
/// [`crate::lookup::BestInstance::NoMatch`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read instance catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
