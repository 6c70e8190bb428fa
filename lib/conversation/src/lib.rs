//! Conversation service for the solace support platform.
//!
//! This crate provides:
//!
//! - **Session Registry**: Get-or-create store of per-key conversation sessions
//! - **Conversation Orchestrator**: Crisis triage ahead of every model call,
//!   with all-or-nothing commits of each round trip
//! - **Response Policy**: Uniform response envelopes that always carry
//!   readable text

pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod response;
pub mod session;
pub mod turn;

pub use error::{ConversationError, SessionError};
pub use orchestrator::{ConversationOrchestrator, DEFAULT_MODEL_TIMEOUT};
pub use registry::{InMemorySessionRegistry, SessionRegistry, SharedSession};
pub use response::{Outcome, ResponseEnvelope, ResponsePolicy};
pub use session::Session;
pub use turn::Turn;
