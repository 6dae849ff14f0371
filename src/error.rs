use thiserror::Error;

/// Failures surfaced by the persistence layer and the car orchestrator.
///
/// Nothing in the core recovers from these; they travel unchanged to the
/// HTTP boundary, which turns them into a response.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation required an existing row that is absent.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("validation error: {0}")]
    Validation(String),

    /// The operation would leave dependent rows dangling.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
