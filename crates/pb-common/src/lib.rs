//! Phytotron Backbone common types, identities, and errors.
//!
//! This crate provides foundational types shared across pb-core modules:
//! - Sample and node identity types with the never-null fallback rule
//! - Logical stream names and their spool file layout
//! - Common error types

pub mod error;
pub mod id;
pub mod stream;

pub use error::{Error, Result};
pub use id::{CycleId, NodeId, SampleIdentity};
pub use stream::StreamName;
