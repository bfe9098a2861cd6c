//! Schema management: wire framing, cached registry and remote resolution
//!
//! The registry keeps a bidirectional in-memory cache (id and subject both
//! resolve to the same shared [`Schema`] instance) in front of a remote
//! [`SchemaResolver`]. Remote calls are the expensive, failure-prone path:
//! lookups hit the resolver exactly once and registration is the only
//! operation that retries.

mod error;
mod registry;
mod resolver;
pub mod wire;

pub use error::{DecodeFailure, SchemaError};
pub use registry::{DecodedPair, RegistryConfig, Schema, SchemaRegistry};
pub use resolver::{HttpSchemaResolver, SchemaResolver, DEFAULT_REGISTRY_URL};
