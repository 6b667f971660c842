//! LLM Clients
//!
//! Agents talk to models through the [`LLMClient`] trait. The only bundled
//! provider is [`OpenAIClient`], which speaks the OpenAI chat-completions
//! protocol and therefore also works with compatible gateways (OpenRouter,
//! vLLM, Ollama's `/v1` endpoint, ...) via `[llm] api_base`.
//!
//! ```ignore
//! let client = OpenAIClient::from_config(&config.llm, config.llm_api_key()?)?;
//! let answer = client.generate_with_system("You are terse.", "What is DNS?").await?;
//! ```

/// Core LLM client trait and conversation types.
pub mod client;
/// OpenAI-compatible chat completions over HTTP.
pub mod openai;

pub use client::{ConversationMessage, LLMClient, LLMResponse, MessageRole};
pub use openai::OpenAIClient;
