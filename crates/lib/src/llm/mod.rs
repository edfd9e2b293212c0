//! LLM client for the Gemini generative-language API.
//!
//! Supports single-turn text generation and listing available models.

mod gemini;

pub use gemini::{GeminiClient, GeminiError, GeminiModel, GenerateResponse};
