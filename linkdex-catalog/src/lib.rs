//! Resource catalog data model types.
//!
//! This crate defines the persistent data model for the resource catalog
//! without any database dependencies. Consumers can use these types directly
//! for serialization, display, or passing to `linkdex-db` for persistence.

pub mod tags;
pub mod types;

pub use tags::split_tags;
pub use types::*;
