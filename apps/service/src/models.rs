use serde::{Deserialize, Serialize};

/// A monitored endpoint.
///
/// Immutable once registered; the store assigns `id` and keeps it stable for
/// the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub id: i64,
    pub name: String,
    pub url: String,
}
