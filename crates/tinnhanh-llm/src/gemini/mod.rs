//! Google Gemini `generateContent` adapter (API-key auth, non-streaming).

pub mod provider;
pub mod types;

pub use provider::{GeminiClient, GeminiConfig};
pub use types::*;
