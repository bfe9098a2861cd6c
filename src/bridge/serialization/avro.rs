//! Avro datum codec

use apache_avro::{from_avro_datum, to_avro_datum, Schema as AvroSchema};
use std::io::Cursor;

use super::{DecodedValue, Decoder, Encoder, SerializationError};

/// Avro codec bound to a writer schema
///
/// Payloads are raw Avro datums (no object-container framing); the schema id
/// header written by the registry identifies the writer schema on the wire.
pub struct AvroCodec {
    schema: AvroSchema,
}

impl AvroCodec {
    pub fn new(schema: AvroSchema) -> Self {
        Self { schema }
    }

    /// Parse an Avro schema definition and build a codec for it
    pub fn from_definition(definition: &str) -> Result<Self, SerializationError> {
        let schema = AvroSchema::parse_str(definition)?;
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }
}

impl Decoder for AvroCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedValue, SerializationError> {
        let mut cursor = Cursor::new(data);
        let value = from_avro_datum(&self.schema, &mut cursor, None)?;
        Ok(DecodedValue::Avro(value))
    }
}

impl Encoder for AvroCodec {
    fn encode(&self, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        match value {
            DecodedValue::Avro(datum) => {
                let bytes = to_avro_datum(&self.schema, datum.clone())?;
                out.extend_from_slice(&bytes);
                Ok(())
            }
            other => Err(SerializationError::UnsupportedType(format!(
                "Avro codec cannot encode {:?}",
                other
            ))),
        }
    }
}
