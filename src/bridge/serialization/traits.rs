//! Codec traits and the decoded value representation

use super::SerializationError;

/// A decoded payload, tagged by the codec family that produced it
///
/// Decoding is schema-driven, so the concrete variant a consumer receives is
/// determined by the codec registered with the schema that framed the
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    /// Raw bytes, untouched by any codec
    Bytes(Vec<u8>),
    /// UTF-8 text
    Text(String),
    /// Parsed JSON document
    Json(serde_json::Value),
    /// Avro datum decoded against the schema's writer schema
    Avro(apache_avro::types::Value),
}

/// Decodes raw payload bytes into a [`DecodedValue`]
pub trait Decoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DecodedValue, SerializationError>;
}

/// Encodes a [`DecodedValue`] by appending its byte representation to `out`
///
/// Appending (rather than returning a fresh buffer) lets callers write the
/// schema header and the payload into one allocation.
pub trait Encoder: Send + Sync {
    fn encode(&self, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), SerializationError>;
}
