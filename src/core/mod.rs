//! Core module containing the controller and the traits it is built on

pub mod controller;
pub mod entity;
pub mod error;
pub mod filter;
pub mod helpers;
pub mod hooks;
pub mod query;
pub mod response;
pub mod store;
pub mod validation;

pub use controller::{DEFAULT_PAGE_SIZE, ResourceController, ResourceControllerBuilder};
pub use entity::Resource;
pub use error::{ConfigError, ControllerError, ControllerResult, RuleError};
pub use filter::{FilterOperator, FilterRule, FilterSpec, Predicate};
pub use helpers::{entity_short_name, success_or_fail};
pub use hooks::{HookOutcome, NoHooks, ResourceHooks};
pub use query::{Page, PageRequest, PaginationMeta};
pub use response::ApiResponse;
pub use store::{QueryBuilder, ResourceStore};
pub use validation::{RuleSet, RuleValidator, ValidationOutcome, Validator};
