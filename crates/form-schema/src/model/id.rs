//! Session-local node identifiers.
//!
//! Node ids give every tree node a stable identity for the lifetime of one
//! editing session. They never appear on the wire and are regenerated on
//! every import.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh node ids.
///
/// Implementations must never hand out the same id twice.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> NodeId;
}

/// Monotonic counter producing `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("node")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Time-ordered UUIDv7 ids, formatted as `prefix-<32 lowercase hex>`.
#[derive(Debug, Clone)]
pub struct UuidIds {
    prefix: String,
}

impl UuidIds {
    pub fn new() -> Self {
        Self::with_prefix("node")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> NodeId {
        NodeId(format!("{}-{}", self.prefix, Uuid::now_v7().simple()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sequential_ids_are_monotonic() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id().as_str(), "node-1");
        assert_eq!(ids.next_id().as_str(), "node-2");
        assert_eq!(ids.next_id().as_str(), "node-3");
    }

    #[test]
    fn test_sequential_ids_prefix() {
        let mut ids = SequentialIds::with_prefix("f");
        assert_eq!(ids.next_id().to_string(), "f-1");
    }

    #[test]
    fn test_uuid_ids_unique() {
        let mut ids = UuidIds::new();
        let seen: HashSet<NodeId> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_uuid_id_format() {
        let id = UuidIds::with_prefix("x").next_id();
        let hex = id.as_str().strip_prefix("x-").unwrap();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
