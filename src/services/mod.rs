// Service exports
pub mod llm;
pub mod openai;

pub use llm::{extract_text, CompletionClient, CompletionRequest, JsonSchemaFormat, LlmError};
pub use openai::OpenAiClient;
