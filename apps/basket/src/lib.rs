//! # Basket - Order Store CLI
//!
//! Library surface of the basket binary. The binary itself lives in
//! `main.rs`; this crate root exposes the CLI structure and the order
//! file parser so integration tests can drive them directly.

pub mod cli;
pub mod parser;
