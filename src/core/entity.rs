//! Resource trait implemented by every record served by a controller

use serde::Serialize;
use uuid::Uuid;

/// A persisted record exposed through a [`ResourceController`]
///
/// The controller needs little from an entity: an identifier, the names used
/// in routes and logs, and the exception marker.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Order {
///     id: Uuid,
///     customer: String,
///     #[serde(default)]
///     is_exception: bool,
/// }
///
/// impl Resource for Order {
///     fn resource_name() -> &'static str { "orders" }
///     fn resource_name_singular() -> &'static str { "order" }
///     fn id(&self) -> Uuid { self.id }
///     fn is_exception(&self) -> bool { self.is_exception }
/// }
/// ```
///
/// [`ResourceController`]: crate::core::controller::ResourceController
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "orders")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "order")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Hidden from `show` while still counting for `exists`
    fn is_exception(&self) -> bool {
        false
    }
}
