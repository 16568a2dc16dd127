//! Small helpers shared by controllers and hooks

use crate::core::response::ApiResponse;

/// Map a boolean outcome to a 200 or 500 envelope
pub fn success_or_fail(success: bool) -> ApiResponse {
    if success {
        ApiResponse::new(200)
    } else {
        ApiResponse::new(500)
    }
}

/// Lower-cased name after the last namespace separator
///
/// Accepts Rust paths (`app::models::Order`) as well as backslash or slash
/// separated names. Generic arguments are ignored.
///
/// ```
/// use resource_controller::core::helpers::entity_short_name;
///
/// assert_eq!(entity_short_name("app::models::Order"), "order");
/// assert_eq!(entity_short_name("App\\Models\\Transaction"), "transaction");
/// assert_eq!(entity_short_name("app::Versioned<app::Order>"), "versioned");
/// ```
pub fn entity_short_name(name: &str) -> String {
    let name = name.split('<').next().unwrap_or(name);
    let tail = name.rsplit("::").next().unwrap_or(name);
    let tail = tail.rsplit(['\\', '/']).next().unwrap_or(tail);
    tail.to_lowercase()
}
