//! Generative backend adapters. Implement GenerativeBackend for LLM integration.
//!
//! Provides Gemini, OpenAI-compatible and mock adapters.

pub mod gemini_adapter;
pub mod mock_adapter;
pub mod openai_adapter;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockBackend;
pub use openai_adapter::OpenAiAdapter;
