//! API exposure modules
//!
//! Each exposure consumes the entity registry and produces a Router for its
//! protocol. REST is the only one provided.

pub mod rest;

pub use rest::RestExposure;
