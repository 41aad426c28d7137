//! Domain Layer - Core intelligence types and dispatch logic.
//!
//! This layer contains the core domain types for intelligence stream
//! messages with no transport dependencies. All types here are pure
//! Rust with serialization support.

/// Intelligence message types (arbitrage, social, risk, market).
pub mod intelligence;

/// Handler registration and frame dispatch.
pub mod dispatch;
