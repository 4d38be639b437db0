//! Errors for repository operations that apply domain rules inside a
//! transaction.

use sportsbook_core::error::CoreError;

/// Failure of a write that runs the availability engine under a row lock.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The domain rules rejected the write (capacity, window, missing rows).
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
