//! HTTP surface for the teamink bridge queue service.
//!
//! Exposed as a library so integration tests can build the same router
//! and middleware stack the production binary uses.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
