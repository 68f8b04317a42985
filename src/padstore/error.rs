use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// One failed target inside a multi-target command.
#[derive(Debug)]
pub struct TargetFailure {
    /// The identifier exactly as the user typed it.
    pub target: String,
    pub error: PadError,
}

impl Serialize for TargetFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TargetFailure", 2)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

impl std::fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.target, self.error)
    }
}

#[derive(Error, Debug)]
pub enum PadError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Identifier \"{input}\" is ambiguous, it matches {count} notes")]
    AmbiguousId { input: String, count: usize },

    #[error("Cannot pin: {cap} notes are already pinned in this scope")]
    Capacity { cap: usize },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{} of {} targets failed", .failures.len(), .total)]
    PartialBatch {
        total: usize,
        failures: Vec<TargetFailure>,
    },
}

impl PadError {
    /// True for failures of the storage layer itself (I/O, unreadable index).
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            PadError::Io(_) | PadError::Serialization(_) | PadError::Store(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_batch_message_counts_failures() {
        let err = PadError::PartialBatch {
            total: 3,
            failures: vec![TargetFailure {
                target: "7".to_string(),
                error: PadError::NotFound("index 7".to_string()),
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 targets failed");
    }

    #[test]
    fn io_errors_are_storage_errors() {
        let err: PadError = std::io::Error::other("disk gone").into();
        assert!(err.is_storage());
        assert!(!PadError::Capacity { cap: 5 }.is_storage());
    }
}
