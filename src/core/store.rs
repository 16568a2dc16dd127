//! Storage contracts consumed by the controller
//!
//! The controller is agnostic to the underlying storage mechanism: it talks
//! to a [`ResourceStore`] for lookups and writes, and to the
//! [`QueryBuilder`] it hands out for filtered, paginated listings.

use crate::core::entity::Resource;
use crate::core::filter::FilterOperator;
use crate::core::query::Page;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A query under construction
///
/// Conditions accumulate and are combined with AND.
#[async_trait]
pub trait QueryBuilder<T>: Send {
    /// `field = value`
    fn where_equals(&mut self, field: &str, value: Value);

    /// `field IN values`
    fn where_in(&mut self, field: &str, values: Vec<Value>);

    /// `field NOT IN values`
    fn where_not_in(&mut self, field: &str, values: Vec<Value>);

    /// `field <operator> value`
    fn where_compare(&mut self, field: &str, operator: FilterOperator, value: Value);

    /// Execute the query and return one page
    ///
    /// `page` starts at 1.
    async fn paginate(self: Box<Self>, size: usize, page: usize) -> Result<Page<T>>;
}

/// Persistence for one resource type
///
/// Write methods report refusals as `Ok(false)`; `Err` is reserved for
/// failures of the backend itself. The controller turns both into a 500
/// envelope.
#[async_trait]
pub trait ResourceStore<T: Resource>: Send + Sync {
    /// Get an entity by ID
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<T>>;

    /// Create an entity from validated fields
    async fn create(&self, fields: Map<String, Value>) -> Result<T>;

    /// Apply `fields` to an existing entity
    ///
    /// On success `entity` is refreshed with the stored state.
    async fn update(&self, entity: &mut T, fields: Map<String, Value>) -> Result<bool>;

    /// Delete an entity
    async fn delete(&self, entity: &T) -> Result<bool>;

    /// Start a query over all entities
    fn query(&self) -> Box<dyn QueryBuilder<T>>;

    /// Whether an entity with this ID is stored, hidden or not
    async fn exists_by_id(&self, id: &Uuid) -> Result<bool>;
}
