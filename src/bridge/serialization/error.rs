//! Serialization error types

/// Errors raised by codec implementations
#[derive(Debug)]
pub enum SerializationError {
    /// The codec cannot represent the supplied value variant
    UnsupportedType(String),
    /// The payload bytes are malformed for this codec
    InvalidData(String),
    /// JSON encode/decode failure
    Json(serde_json::Error),
    /// Avro datum encode/decode failure
    Avro(apache_avro::Error),
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::UnsupportedType(msg) => write!(f, "Unsupported type: {}", msg),
            SerializationError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            SerializationError::Json(err) => write!(f, "JSON error: {}", err),
            SerializationError::Avro(err) => write!(f, "Avro error: {}", err),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializationError::Json(err) => Some(err),
            SerializationError::Avro(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::Json(err)
    }
}

impl From<apache_avro::Error> for SerializationError {
    fn from(err: apache_avro::Error) -> Self {
        SerializationError::Avro(err)
    }
}
