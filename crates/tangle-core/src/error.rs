use thiserror::Error;

use crate::filters::FilterStoreError;
use crate::notifier::NotifierError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] tangle_models::ValidationError),
    #[error("notifier error: {0}")]
    Notifier(#[from] NotifierError),
    #[error("filter store error: {0}")]
    FilterStore(#[from] FilterStoreError),
    #[error("internal error: {0}")]
    Internal(String),
}
