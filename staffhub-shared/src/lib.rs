#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)] // TODO(deps-001): remove once transitive dependencies converge.

//! Models, configuration, and formatting helpers shared by the `StaffHub` client crates.

pub mod config;
pub mod format;
pub mod models;
