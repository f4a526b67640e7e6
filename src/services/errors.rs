use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::infrastructure::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("mutations are disabled")]
    MutationsDisabled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable value of the `extensions.code` field in GraphQL error entries.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unavailable(_) => "STORE_UNAVAILABLE",
            ServiceError::MutationsDisabled => "MUTATIONS_DISABLED",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(_) | StoreError::NotConnected => {
                ServiceError::Unavailable(err.to_string())
            }
            StoreError::Query(message) => ServiceError::Internal(message),
        }
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string())
            .extend_with(|_, ext| ext.set("code", self.code()))
    }
}
