//! CLI Module Organization
//!
//! - args: CLI argument structures
//! - commands: extraction, clustering and configuration commands
//! - config_builder: configuration file loading
//! - output: JSON and table rendering

pub mod args;
pub mod commands;
pub mod config_builder;
pub mod output;

// Re-export commonly used items for convenience
pub use args::*;
pub use commands::*;
