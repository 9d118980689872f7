//! # Configuration
//!
//! Client configuration resolved from defaults, an optional file, and the environment.

pub mod client;

pub use client::{ClientConfig, ConfigError, LogFormat, LoggingConfig, Profile};
