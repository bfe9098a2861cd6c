//! Pluggable codec capabilities for schema-framed payloads
//!
//! Every schema carries an optional [`Decoder`] and [`Encoder`] capability.
//! Codecs translate between raw payload bytes (everything after the 5-byte
//! schema header) and a [`DecodedValue`], the tagged representation handed to
//! application code.
//!
//! # Quick Start
//!
//! ```rust
//! use streambridge::bridge::serialization::{Decoder, Encoder, DecodedValue, JsonCodec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = JsonCodec;
//! let value = DecodedValue::Json(serde_json::json!({"id": 42}));
//!
//! let mut bytes = Vec::new();
//! codec.encode(&value, &mut bytes)?;
//! let restored = codec.decode(&bytes)?;
//!
//! assert_eq!(value, restored);
//! # Ok(())
//! # }
//! ```

mod avro;
mod error;
mod json;
mod raw;
mod traits;

pub use avro::AvroCodec;
pub use error::SerializationError;
pub use json::{from_json, to_json, JsonCodec};
pub use raw::{BytesCodec, StringCodec};
pub use traits::{DecodedValue, Decoder, Encoder};
