//! In-memory implementation of ResourceStore for testing and development

use crate::core::entity::Resource;
use crate::core::filter::{FilterOperator, Predicate};
use crate::core::query::{Page, PaginationMeta};
use crate::core::store::{QueryBuilder, ResourceStore};
use crate::core::validation::validators::as_number;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Entries<T> = Arc<RwLock<IndexMap<Uuid, T>>>;

/// In-memory resource store
///
/// Entities are kept in insertion order and rebuilt from JSON on every
/// write, so `T` must round-trip through serde with an `id` field. Uses
/// RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    entries: Entries<T>,
}

impl<T: Resource + DeserializeOwned> InMemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Create a store seeded with `items`
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let entries = items.into_iter().map(|item| (item.id(), item)).collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Insert or replace an entity as-is, bypassing validation
    pub fn insert(&self, entity: T) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        entries.insert(entity.id(), entity);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Resource + DeserializeOwned> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Resource + DeserializeOwned> ResourceStore<T> for InMemoryStore<T> {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<T>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entries.get(id).cloned())
    }

    async fn create(&self, mut fields: Map<String, Value>) -> Result<T> {
        let id = Uuid::new_v4();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        let entity: T = serde_json::from_value(Value::Object(fields))?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        entries.insert(id, entity.clone());

        Ok(entity)
    }

    async fn update(&self, entity: &mut T, fields: Map<String, Value>) -> Result<bool> {
        let id = entity.id();

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let Some(stored) = entries.get_mut(&id) else {
            return Ok(false);
        };

        let mut merged = match serde_json::to_value(&*entity)? {
            Value::Object(map) => map,
            _ => return Err(anyhow!("{} does not serialize to an object", T::resource_name_singular())),
        };
        merged.extend(fields.into_iter().filter(|(key, _)| key != "id"));
        merged.insert("id".to_string(), Value::String(id.to_string()));

        let updated: T = serde_json::from_value(Value::Object(merged))?;
        *stored = updated.clone();
        *entity = updated;

        Ok(true)
    }

    async fn delete(&self, entity: &T) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(entries.shift_remove(&entity.id()).is_some())
    }

    fn query(&self) -> Box<dyn QueryBuilder<T>> {
        Box::new(InMemoryQuery {
            entries: self.entries.clone(),
            conditions: Vec::new(),
        })
    }

    async fn exists_by_id(&self, id: &Uuid) -> Result<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entries.contains_key(id))
    }
}

/// Query over an [`InMemoryStore`], evaluated on the serialized entities
///
/// Comparisons are loose: `"42"` equals `42` and `"true"` or `"1"` equal
/// `true`, since filter values arrive as query-string text.
pub struct InMemoryQuery<T> {
    entries: Entries<T>,
    conditions: Vec<Predicate>,
}

#[async_trait]
impl<T: Resource> QueryBuilder<T> for InMemoryQuery<T> {
    fn where_equals(&mut self, field: &str, value: Value) {
        self.where_compare(field, FilterOperator::Eq, value);
    }

    fn where_in(&mut self, field: &str, values: Vec<Value>) {
        self.conditions.push(Predicate::In {
            field: field.to_string(),
            values,
        });
    }

    fn where_not_in(&mut self, field: &str, values: Vec<Value>) {
        self.conditions.push(Predicate::NotIn {
            field: field.to_string(),
            values,
        });
    }

    fn where_compare(&mut self, field: &str, operator: FilterOperator, value: Value) {
        self.conditions.push(Predicate::Compare {
            field: field.to_string(),
            operator,
            value,
        });
    }

    async fn paginate(self: Box<Self>, size: usize, page: usize) -> Result<Page<T>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matching = Vec::new();
        for entity in entries.values() {
            let json = serde_json::to_value(entity)?;
            if self.conditions.iter().all(|c| matches(c, &json)) {
                matching.push(entity);
            }
        }

        let pagination = PaginationMeta::new(page, size, matching.len());
        let items = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .cloned()
            .collect();

        Ok(Page { items, pagination })
    }
}

fn matches(condition: &Predicate, entity: &Value) -> bool {
    let actual = entity.get(condition.field()).unwrap_or(&Value::Null);

    match condition {
        Predicate::Compare {
            operator, value, ..
        } => match operator {
            FilterOperator::Eq => loose_eq(actual, value),
            FilterOperator::Ne => !loose_eq(actual, value),
            FilterOperator::Gt => loose_cmp(actual, value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                loose_cmp(actual, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => loose_cmp(actual, value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                loose_cmp(actual, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        },
        Predicate::In { values, .. } => values.iter().any(|v| loose_eq(actual, v)),
        Predicate::NotIn { values, .. } => !values.iter().any(|v| loose_eq(actual, v)),
    }
}

fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Bool(b), other) | (other, Value::Bool(b)) => as_bool(other) == Some(*b),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(actual), as_number(expected)), (Some(a), Some(b)) if a == b)
        }
        _ => actual == expected,
    }
}

fn loose_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a.partial_cmp(&b);
    }
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(1.0) => Some(true),
            Some(0.0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
