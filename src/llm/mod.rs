//! LLM domain — prompt, provider adapters, response cleanup.
//!
//! Providers:
//!   - OpenAI (openai.rs)
//!   - Google Gemini (gemini.rs)
//!   - Anthropic Claude (anthropic.rs)
//!   - Ollama, local (ollama.rs)
//!
//! Shared:
//!   - client.rs   — `CompletionBackend` trait + `AiClient` dispatch
//!   - provider.rs — provider enum + metadata
//!   - prompts.rs  — generation prompt
//!   - sanitize.rs — fence stripping, script extraction, validation

mod anthropic;
pub mod client;
mod gemini;
mod ollama;
mod openai;
pub mod prompts;
pub mod provider;
pub mod sanitize;

pub use client::{AiClient, CompletionBackend};
pub use ollama::{DEFAULT_HOST as OLLAMA_DEFAULT_HOST, DEFAULT_MODEL as OLLAMA_DEFAULT_MODEL};
pub use provider::{all_providers, Provider, ProviderInfo};
