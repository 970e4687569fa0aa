//! doimint CLI - Command-line interface for batch DOI registration
//!
//! This crate provides the CLI application that ties together the reader,
//! mapper, and API client.

pub mod config;

pub use config::{Config, EventArg};
