//! Error types used throughout the domain

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Lookerkit domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LookerkitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Lookerkit domain operations
pub type Result<T> = std::result::Result<T, LookerkitError>;

/// A caller-supplied argument rejected before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{arg} is invalid because {reason}")]
pub struct ArgError {
    /// Name of the offending argument
    pub arg: String,
    pub reason: String,
}

impl ArgError {
    pub fn new(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { arg: arg.into(), reason: reason.into() }
    }
}

impl From<ArgError> for LookerkitError {
    fn from(err: ArgError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<serde_json::Error> for LookerkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_error_display() {
        let err = ArgError::new("id", "cannot be less than 1");
        assert_eq!(err.to_string(), "id is invalid because cannot be less than 1");
    }

    #[test]
    fn test_error_serializes_tagged() {
        let err = LookerkitError::Config("missing base_url".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"type":"Config","message":"missing base_url"}"#);
    }

    #[test]
    fn test_arg_error_converts_to_invalid_input() {
        let err: LookerkitError = ArgError::new("ids", "cannot be empty").into();
        assert!(matches!(err, LookerkitError::InvalidInput(msg) if msg.contains("ids")));
    }
}
