//! CLI Command Implementations
//!
//! - analyze: extract, cluster and run commands
//! - config: configuration management commands

pub mod analyze;
pub mod config;

pub use analyze::{cluster_command, extract_command, run_command};
pub use config::{init_config, print_default_config, validate_config};
