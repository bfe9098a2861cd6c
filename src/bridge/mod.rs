pub mod kafka;
pub mod schema;
pub mod serialization;
