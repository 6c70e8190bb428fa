//! Core domain types and utilities for the solace support service.
//!
//! This crate provides the identifier types and the error-handling
//! foundation shared by the triage, conversation and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{RequestId, SessionKey, TurnId};
