//! LLM-backed [`Translator`](deck_core::Translator) for slide decks.
//!
//! Sends each paragraph to an OpenAI-compatible chat completion endpoint
//! with a prompt that asks for translations close to the source length,
//! retrying rate-limit and server errors with backoff.

pub mod client;
pub mod filter;
pub mod prompt;
pub mod retry;

pub use client::ChatTranslator;
pub use filter::needs_translation;
pub use prompt::build_system_prompt;
pub use retry::RetryPolicy;
