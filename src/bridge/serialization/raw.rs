//! Pass-through codecs for raw bytes and UTF-8 text

use super::{DecodedValue, Decoder, Encoder, SerializationError};

/// Raw bytes codec that performs no transformation
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Decoder for BytesCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedValue, SerializationError> {
        Ok(DecodedValue::Bytes(data.to_vec()))
    }
}

impl Encoder for BytesCodec {
    fn encode(&self, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        match value {
            DecodedValue::Bytes(bytes) => {
                out.extend_from_slice(bytes);
                Ok(())
            }
            other => Err(SerializationError::UnsupportedType(format!(
                "bytes codec cannot encode {:?}",
                other
            ))),
        }
    }
}

/// UTF-8 string codec
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Decoder for StringCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedValue, SerializationError> {
        let text = String::from_utf8(data.to_vec())
            .map_err(|e| SerializationError::InvalidData(format!("invalid UTF-8: {}", e)))?;
        Ok(DecodedValue::Text(text))
    }
}

impl Encoder for StringCodec {
    fn encode(&self, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        match value {
            DecodedValue::Text(text) => {
                out.extend_from_slice(text.as_bytes());
                Ok(())
            }
            other => Err(SerializationError::UnsupportedType(format!(
                "string codec cannot encode {:?}",
                other
            ))),
        }
    }
}
