//! # Resource Controller
//!
//! A generic CRUD controller for building RESTful resource APIs in Rust.
//!
//! ## Features
//!
//! - **Declarative rules**: Laravel-style rule strings (`required|email`) parsed into typed constraints
//! - **Declared filters**: Query parameters mapped to `=`, `!=`, `<`, `>`, `IN` and `NOT IN` conditions
//! - **Lifecycle hooks**: Async before/after hooks that can veto writes with their own response
//! - **Uniform envelope**: Every outcome is a JSON body with `status` and `message`
//! - **Configuration-Based**: Rules, filters and page sizes can live in YAML
//! - **Axum exposure**: One call registers the six routes of a resource
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resource_controller::prelude::*;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Order {
//!     id: Uuid,
//!     customer: String,
//!     total: f64,
//! }
//!
//! impl Resource for Order {
//!     fn resource_name() -> &'static str { "orders" }
//!     fn resource_name_singular() -> &'static str { "order" }
//!     fn id(&self) -> Uuid { self.id }
//! }
//!
//! let orders = ResourceController::builder(InMemoryStore::<Order>::new())
//!     .create_rules(RuleSet::parse([("customer", "required|string"), ("total", "required|numeric")])?)
//!     .filters(FilterSpec::new().implicit("customer"))
//!     .build();
//!
//! ServerBuilder::new()
//!     .register_resource(orders)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        controller::{DEFAULT_PAGE_SIZE, ResourceController, ResourceControllerBuilder},
        entity::Resource,
        error::{ConfigError, ControllerError, RuleError},
        filter::{FilterOperator, FilterRule, FilterSpec},
        helpers::success_or_fail,
        hooks::{HookOutcome, NoHooks, ResourceHooks},
        query::{Page, PaginationMeta},
        response::ApiResponse,
        store::{QueryBuilder, ResourceStore},
        validation::{Constraint, FieldRules, RuleSet, RuleValidator, ValidationOutcome, Validator},
    };

    // === Storage ===
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{AppConfig, ResourceConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder, init_tracing};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Map, Value, json};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        routing::{delete, get, post, put},
    };
}
