use std::fmt::{self, Display};

/// Errors produced when parsing model values from request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownMode(String),
    UnknownStatsMode(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownMode(raw) => write!(f, "unknown query mode: {raw}"),
            ModelError::UnknownStatsMode(raw) => {
                write!(f, "unknown statistics mode: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
