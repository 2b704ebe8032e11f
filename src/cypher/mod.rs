//! # Cypher Generation
//!
//! The patterns this crate sends, and the lexer used to rebind filter
//! variables. Pure functions: no I/O, no state, no executor dependency.
//! Grammar validation is left to the store.

pub mod lexer;
pub mod patterns;
