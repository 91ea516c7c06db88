use async_trait::async_trait;
use serde::Serialize;

use super::error::GenerationError;

/// Structured-output schema, serialized in the shape the generation API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Array,
}

impl Schema {
    pub fn string_array() -> Self {
        Schema {
            kind: SchemaType::Array,
            items: Some(Box::new(Schema {
                kind: SchemaType::String,
                items: None,
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<Schema>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
        }
    }

    pub fn structured(prompt: impl Into<String>, schema: Schema) -> Self {
        Self {
            prompt: prompt.into(),
            schema: Some(schema),
        }
    }
}

/// The external text-generation capability.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Stand-in used when no API key is configured or `--offline` is given.
pub struct OfflineGenerator;

#[async_trait]
impl Generate for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}
