//! Surge server
//!
//! Wires configuration, logging, the load test engine, the optional
//! analysis collaborator and the REST API into one process.

pub mod startup;

// Re-export main components
pub use startup::*;
