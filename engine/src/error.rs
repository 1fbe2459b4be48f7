use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed input, rejected before any index is consulted.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("event not found: {0}")]
    NotFound(String),
    /// No corpus has been loaded yet.
    #[error("index unavailable: no corpus has been loaded")]
    IndexUnavailable,
    /// An index structure disagrees with the document store. Never recovered from.
    #[error("index corrupted: {0}")]
    Corrupted(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn corrupted(msg: impl Into<String>) -> Self {
        EngineError::Corrupted(msg.into())
    }

    /// The inner message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            EngineError::Validation(m) | EngineError::NotFound(m) | EngineError::Corrupted(m) => m.clone(),
            EngineError::IndexUnavailable => self.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
