//! Error types for the user-agent decoder.
//!
//! Only construction-time failures surface to the caller; per-record
//! conditions degrade to pass-through and are never propagated.

use std::fmt;

/// The main error type for decoder construction and record operations.
#[derive(Debug)]
pub enum DecoderError {
    /// Required configuration was missing or invalid.
    Config(String),

    /// The rule file could not be read or parsed. Fatal at startup.
    Init(String),

    /// A pattern in the rule file failed to compile.
    InvalidRule { pattern: String, reason: String },

    /// A field with the same name already exists on the record.
    FieldConflict(String),
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderError::Config(msg) => write!(f, "configuration error: {}", msg),
            DecoderError::Init(msg) => write!(f, "initialization error: {}", msg),
            DecoderError::InvalidRule { pattern, reason } => {
                write!(f, "invalid rule pattern '{}': {}", pattern, reason)
            }
            DecoderError::FieldConflict(name) => {
                write!(f, "field already exists: '{}'", name)
            }
        }
    }
}

impl std::error::Error for DecoderError {}

/// A specialized Result type for decoder operations.
pub type DecoderResult<T> = Result<T, DecoderError>;
