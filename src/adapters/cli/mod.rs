//! Driving adapters. Feed transport input into the protocol handler.

pub mod jsonl;

pub use jsonl::JsonLinesInput;
