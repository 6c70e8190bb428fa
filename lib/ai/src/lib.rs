//! Generative model client for the solace support service.
//!
//! This crate provides:
//!
//! - **Chat Backend**: The stateless `send_message(history, message, config)`
//!   contract the conversation layer calls
//! - **Generation Config**: The per-session model and sampling snapshot
//! - **Gemini Backend**: A `reqwest` implementation against Google's
//!   `generateContent` API

pub mod backend;
pub mod error;
pub mod gemini;

pub use backend::{ChatBackend, GenerationConfig, LlmMessage, MessageRole};
pub use error::LlmError;
pub use gemini::GeminiBackend;
