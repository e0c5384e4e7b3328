use thiserror::Error;

/// Errors raised by the game session engine.
///
/// All of them are local to the call that produced them; a failing call
/// leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed or empty game data
    #[error("invalid game data: {0}")]
    Validation(String),
    /// Out-of-range index into pairs, cards or options
    #[error("index {index} out of range (len {len})")]
    Index { index: usize, len: usize },
    /// Operation not allowed in the current session state
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl EngineError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        EngineError::InvalidState(msg.into())
    }
}

/// Errors raised by the local game library and result history.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed game data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("game {0} not found")]
    NotFound(i64),
    #[error("game {0} belongs to another player")]
    NotOwner(i64),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_message_names_bounds() {
        let err = EngineError::Index { index: 4, len: 2 };
        assert_eq!(err.to_string(), "index 4 out of range (len 2)");
    }

    #[test]
    fn engine_error_converts_into_store_error() {
        let err: StoreError = EngineError::validation("empty").into();
        assert!(matches!(err, StoreError::Engine(EngineError::Validation(_))));
        assert_eq!(err.to_string(), "invalid game data: empty");
    }
}
