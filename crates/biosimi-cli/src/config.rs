//! Layered configuration for the composition subcommands: built-in defaults,
//! then the composition file, then `-S key=value` overrides, then explicit
//! flags.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::build_config;
pub use models::{AppConfig, Operator};
