//! Core error types for habitforge-core.
//!
//! The pure calculator and state-machine functions are total over their
//! documented domains and never return these; errors surface only from
//! validation paths (stat allocation) and the thin by-id service wrappers.

use thiserror::Error;

/// Core error type for habitforge-core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A quantity was outside its accepted range (e.g. a negative
    /// allocation where a non-negative count is required).
    #[error("Value out of range for '{field}': {message}")]
    InputOutOfRange { field: &'static str, message: String },

    /// A stat allocation asked for more points than the character has earned.
    #[error("Insufficient stat points: requested {requested}, available {available}")]
    InsufficientStatPoints { requested: u32, available: u32 },

    /// A stat allocation would push a single stat above the hard ceiling.
    #[error("Stat ceiling exceeded: {stat} would reach {would_reach} (ceiling {ceiling})")]
    StatCeilingExceeded {
        stat: &'static str,
        would_reach: u32,
        ceiling: u32,
    },

    /// No task snapshot exists for the given id.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// No user profile exists for the given id.
    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
