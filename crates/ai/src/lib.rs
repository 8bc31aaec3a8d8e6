//! AI gateway: turns source files into test summaries and test code using
//! an ordered list of LLM providers.
//!
//! Providers are tried in order within one shared time budget; see
//! [`AiGateway`].

mod error;
mod gateway;
mod gemini;
mod openai;
mod prompt;
mod provider;

pub use error::AiError;
pub use gateway::{AiGateway, DEFAULT_BUDGET, GeneratedCode};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;
