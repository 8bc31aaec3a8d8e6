use async_trait::async_trait;

use crate::error::AiError;

/// A text-completion backend.
///
/// Implementations send one prompt and return the model's raw text. Parsing
/// and fallback live in [`crate::AiGateway`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Display name used in errors and logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Sampling parameters shared by the built-in providers.
pub const TEMPERATURE: f32 = 0.3;
pub const MAX_OUTPUT_TOKENS: u32 = 4000;
