//! Schema header framing
//!
//! Every encoded key and value is prefixed with a fixed 5-byte header:
//! byte 0 is the reserved magic byte `0x00`, bytes 1-4 are the big-endian
//! unsigned 32-bit schema id. A zero-length buffer is not a frame at all but
//! the "no message this poll" sentinel, handled before any header read.

use super::SchemaError;

pub const SCHEMA_HEADER_LEN: usize = 5;
pub const MAGIC_BYTE: u8 = 0x00;

/// Append the 5-byte schema header to `out`
pub fn write_schema_header(schema_id: u32, out: &mut Vec<u8>) {
    out.push(MAGIC_BYTE);
    out.extend_from_slice(&schema_id.to_be_bytes());
}

/// Read the schema header, returning the schema id and the payload remainder
pub fn read_schema_header(buf: &[u8]) -> Result<(u32, &[u8]), SchemaError> {
    if buf.len() < SCHEMA_HEADER_LEN {
        return Err(SchemaError::Framing {
            message: format!(
                "header expected [{}] bytes but only [{}] available",
                SCHEMA_HEADER_LEN,
                buf.len()
            ),
        });
    }
    if buf[0] != MAGIC_BYTE {
        return Err(SchemaError::Framing {
            message: format!("magic byte is not [0] but was [{}]", buf[0]),
        });
    }
    let mut id_bytes = [0u8; 4];
    id_bytes.copy_from_slice(&buf[1..SCHEMA_HEADER_LEN]);
    Ok((u32::from_be_bytes(id_bytes), &buf[SCHEMA_HEADER_LEN..]))
}
