//! # nuclear-core
//!
//! Core types, traits, and abstractions for the Nuclear AO3 tag services.
//!
//! This crate provides the foundational data structures (tags, prominence,
//! work tag assignments) and the collaborator traits that the classifier in
//! `nuclear-tags` depends on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use tags::*;
pub use traits::*;
