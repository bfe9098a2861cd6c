//! Remote schema resolution
//!
//! [`SchemaResolver`] is the seam between the local registry cache and the
//! remote schema-registry service. [`HttpSchemaResolver`] talks to the
//! Confluent Schema Registry REST API; tests substitute in-memory resolvers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::SchemaError;

/// Default schema registry endpoint
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:8081";

/// Looks up and registers schemas in a remote registry
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Resolve the numeric id registered for `subject` at `version`
    async fn schema_by_subject(&self, subject: &str, version: i32) -> Result<u32, SchemaError>;

    /// Register a schema definition under `subject`, returning its id
    async fn register_schema(&self, subject: &str, definition: &str) -> Result<u32, SchemaError>;
}

#[derive(Debug, Deserialize)]
struct SubjectVersionResponse {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: u32,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    schema: &'a str,
}

/// HTTP client for the Confluent Schema Registry REST API
pub struct HttpSchemaResolver {
    base_url: String,
    client: Client,
}

impl HttpSchemaResolver {
    /// Create a resolver against the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolution_error(subject: &str, err: impl std::fmt::Display) -> SchemaError {
        SchemaError::Resolution {
            subject: subject.to_string(),
            message: err.to_string(),
        }
    }
}

impl Default for HttpSchemaResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait]
impl SchemaResolver for HttpSchemaResolver {
    async fn schema_by_subject(&self, subject: &str, version: i32) -> Result<u32, SchemaError> {
        let url = format!(
            "{}/subjects/{}/versions/{}",
            self.base_url, subject, version
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::resolution_error(subject, e))?;
        let body: SubjectVersionResponse = response
            .json()
            .await
            .map_err(|e| Self::resolution_error(subject, e))?;
        Ok(body.id)
    }

    async fn register_schema(&self, subject: &str, definition: &str) -> Result<u32, SchemaError> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest { schema: definition })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::resolution_error(subject, e))?;
        let body: RegisterResponse = response
            .json()
            .await
            .map_err(|e| Self::resolution_error(subject, e))?;
        Ok(body.id)
    }
}
