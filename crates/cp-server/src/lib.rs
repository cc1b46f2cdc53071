//! Car pooling service front end.
//!
//! This crate provides the CLI, configuration and HTTP transport around the
//! `cp-core` dispatcher.

mod cli;
pub mod commands;
mod config;
pub mod http;

pub use cli::{Cli, Commands};
pub use config::Config;
