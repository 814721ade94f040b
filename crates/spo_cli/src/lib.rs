//! spo-batch CLI library exports for testing.
//!
//! This module exposes command implementations so they can be driven without a terminal.

pub mod commands;
pub mod config;
pub mod errors;
pub mod validation;

#[cfg(test)]
mod test_support;
