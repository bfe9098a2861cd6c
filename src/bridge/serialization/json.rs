//! JSON codec

use serde::{Deserialize, Serialize};

use super::{DecodedValue, Decoder, Encoder, SerializationError};

/// Serialize a value to JSON bytes
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(value).map_err(SerializationError::from)
}

/// Deserialize JSON bytes to a value
pub fn from_json<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::from)
}

/// JSON codec: payloads are self-describing JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Decoder for JsonCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedValue, SerializationError> {
        Ok(DecodedValue::Json(from_json(data)?))
    }
}

impl Encoder for JsonCodec {
    fn encode(&self, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        match value {
            DecodedValue::Json(doc) => {
                out.extend_from_slice(&to_json(doc)?);
                Ok(())
            }
            DecodedValue::Null => {
                out.extend_from_slice(b"null");
                Ok(())
            }
            other => Err(SerializationError::UnsupportedType(format!(
                "JSON codec cannot encode {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let codec = JsonCodec;
        let value = DecodedValue::Json(serde_json::json!({"id": 7, "name": "order"}));

        let mut bytes = Vec::new();
        codec.encode(&value, &mut bytes).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_json_null_encodes_as_null_literal() {
        let codec = JsonCodec;
        let mut bytes = Vec::new();
        codec.encode(&DecodedValue::Null, &mut bytes).unwrap();
        assert_eq!(bytes, b"null");
    }

    #[test]
    fn test_json_rejects_foreign_variant() {
        let codec = JsonCodec;
        let mut bytes = Vec::new();
        let result = codec.encode(&DecodedValue::Bytes(vec![1, 2]), &mut bytes);
        assert!(matches!(
            result,
            Err(SerializationError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_json_invalid_payload() {
        let codec = JsonCodec;
        assert!(codec.decode(b"{not json").is_err());
    }
}
