//! Error types for the authorization graph.

use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced permission id does not exist. Single-entity lookups and
    /// the resolver surface this instead of substituting an empty result.
    #[error("Permission {0} not found")]
    PermissionNotFound(Uuid),

    /// No permission carries the given slug.
    #[error("Permission with slug '{0}' not found")]
    PermissionSlugNotFound(String),

    /// Attach attempted against a permission or role that does not exist,
    /// or an insert would violate a uniqueness constraint. Rejected before
    /// any row is written.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Underlying store unavailable or query failed. Propagated unchanged;
    /// retry policy belongs to the caller.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Map a unique-constraint violation to [`Error::IntegrityViolation`],
    /// leaving every other database error untouched.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::IntegrityViolation(format!("{what} already exists"))
            }
            _ => Self::Database(err),
        }
    }
}
