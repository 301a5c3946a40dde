//! Shared domain types and errors for the teamink backend.

pub mod error;
pub mod types;
