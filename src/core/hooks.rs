//! Lifecycle hooks for resource controllers
//!
//! A concrete resource customises the standard flow by implementing
//! [`ResourceHooks`]. Every method has a no-op default, so only the stages
//! that matter need to be written.
//!
//! - `before_list`, `before_show` and all `after_*` hooks may mutate their
//!   argument but cannot stop the operation.
//! - `before_create`, `before_update` and `before_delete` return a
//!   [`HookOutcome`]; `Abort(response)` skips persistence and the response is
//!   returned to the caller unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! struct OrderHooks;
//!
//! #[async_trait]
//! impl ResourceHooks<Order> for OrderHooks {
//!     async fn before_delete(&self, order: &Order) -> HookOutcome {
//!         if order.shipped {
//!             return HookOutcome::Abort(ApiResponse::with_message(409, "order already shipped"));
//!         }
//!         HookOutcome::Continue
//!     }
//! }
//! ```

use crate::core::entity::Resource;
use crate::core::response::ApiResponse;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Decision returned by the before-hooks of mutating operations
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Proceed with the default flow
    Continue,
    /// Stop and return this response
    Abort(ApiResponse),
}

impl HookOutcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, HookOutcome::Abort(_))
    }
}

/// Extension points of the controller lifecycle
#[async_trait]
pub trait ResourceHooks<T: Resource>: Send + Sync {
    /// Called with the items of a page before they are returned
    async fn before_list(&self, _items: &mut Vec<T>) {}

    /// Called with a found, visible entity before it is returned
    async fn before_show(&self, _entity: &mut T) {}

    /// Called with the validated body before the entity is created
    async fn before_create(&self, _data: &mut Map<String, Value>) -> HookOutcome {
        HookOutcome::Continue
    }

    /// Called with the created entity
    async fn after_create(&self, _entity: &T) {}

    /// Called with the stored entity and the validated body before updating
    async fn before_update(&self, _entity: &mut T, _data: &mut Map<String, Value>) -> HookOutcome {
        HookOutcome::Continue
    }

    /// Called after a successful update
    async fn after_update(&self, _entity: &T) {}

    /// Called with the entity before it is deleted
    async fn before_delete(&self, _entity: &T) -> HookOutcome {
        HookOutcome::Continue
    }

    /// Called after a successful deletion
    async fn after_delete(&self, _entity: &T) {}
}

/// Hooks that keep the default flow
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<T: Resource> ResourceHooks<T> for NoHooks {}
