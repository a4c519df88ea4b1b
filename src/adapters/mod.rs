//! Infrastructure adapters. Implement ports.
//!
//! Protocol handler, libsql persistence, JSON-lines transport.

pub mod cli;
pub mod persistence;
pub mod protocol;
