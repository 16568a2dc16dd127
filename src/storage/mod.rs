//! Storage implementations for resource stores

pub mod in_memory;

pub use in_memory::{InMemoryQuery, InMemoryStore};
