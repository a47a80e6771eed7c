//! Phytotron Backbone configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the curation config file
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation with per-field diagnostics

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{CurationConfig, JoinTolerances, StreamWindows, ValidationBounds};
pub use resolve::{resolve_config, ConfigSource};
pub use validate::{validate, ValidationError};
