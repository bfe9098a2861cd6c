//! Schema subsystem error types

use crate::bridge::serialization::{DecodedValue, SerializationError};

/// Errors raised by the schema framing, cache and registry
#[derive(Debug)]
pub enum SchemaError {
    /// Malformed 5-byte schema header
    Framing { message: String },
    /// The schema is not in the local cache
    NotFound { key: String },
    /// Remote resolver call failed; lookups are never retried
    Resolution { subject: String, message: String },
    /// Remote registration failed after exhausting the retry budget
    Registration {
        subject: String,
        attempts: u32,
        message: String,
    },
    /// The schema has no decoder capability
    DecoderMissing { id: u32 },
    /// The schema has no encoder capability
    EncoderMissing { id: u32 },
    /// Schema definition file could not be read
    Io(std::io::Error),
    /// Codec failure while decoding or encoding a payload
    Serialization(SerializationError),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Framing { message } => write!(f, "Framing error: {}", message),
            SchemaError::NotFound { key } => write!(f, "Schema not found [{}]", key),
            SchemaError::Resolution { subject, message } => {
                write!(f, "Schema resolution error [{}]: {}", subject, message)
            }
            SchemaError::Registration {
                subject,
                attempts,
                message,
            } => write!(
                f,
                "Schema registration failed [{}] after {} attempts: {}",
                subject, attempts, message
            ),
            SchemaError::DecoderMissing { id } => write!(f, "No decoder for schema [{}]", id),
            SchemaError::EncoderMissing { id } => write!(f, "No encoder for schema [{}]", id),
            SchemaError::Io(err) => write!(f, "Schema definition IO error: {}", err),
            SchemaError::Serialization(err) => write!(f, "Schema codec error: {}", err),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Io(err) => Some(err),
            SchemaError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::Io(err)
    }
}

impl From<SerializationError> for SchemaError {
    fn from(err: SerializationError) -> Self {
        SchemaError::Serialization(err)
    }
}

/// A decode failure that may carry the half of the message that did decode
///
/// The key side of a message is decoded first; when the value side fails the
/// caller still receives the decoded key for diagnostics alongside the error.
#[derive(Debug)]
pub struct DecodeFailure {
    /// Decoded key, present when only the value side failed
    pub key: Option<DecodedValue>,
    pub error: SchemaError,
}

impl DecodeFailure {
    pub(crate) fn bare(error: SchemaError) -> Self {
        Self { key: None, error }
    }

    pub(crate) fn with_key(key: DecodedValue, error: SchemaError) -> Self {
        Self {
            key: Some(key),
            error,
        }
    }
}

impl std::fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<SchemaError> for DecodeFailure {
    fn from(error: SchemaError) -> Self {
        DecodeFailure::bare(error)
    }
}

impl From<DecodeFailure> for SchemaError {
    fn from(failure: DecodeFailure) -> Self {
        failure.error
    }
}
