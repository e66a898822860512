use plug_core::error::CoreError;

use crate::store::StoreError;

/// Error returned by the entity and lookup repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Domain failure: unknown entity, validation, not found, conflict.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record store failed while serving `entity`.
    #[error("storage failure on {entity}: {source}")]
    Storage {
        entity: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Attach the entity name to a store result.
pub(crate) trait StoreResultExt<T> {
    fn for_entity(self, entity: &'static str) -> RepoResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn for_entity(self, entity: &'static str) -> RepoResult<T> {
        self.map_err(|source| RepoError::Storage { entity, source })
    }
}
