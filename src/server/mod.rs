//! Server module for exposing resource controllers over HTTP
//!
//! This module provides a `ServerBuilder` that registers:
//! - CRUD routes for every resource controller
//! - Health routes (`/health`, `/healthz`)
//! - Custom routes supplied by the application

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod router;
pub mod tracing;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry, ResourceDescriptor};
pub use router::build_resource_routes;
pub use tracing::init_tracing;
