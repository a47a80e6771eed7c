//! Sample, node, and cycle identity types.
//!
//! Telemetry rows carry two identifiers: the logical node number assigned by
//! the mesh (`NodeId`, reassigned when hardware is swapped or renumbered) and
//! the stable physical-sensor identity (`SampleIdentity`). Curated output
//! must always carry a non-null sample identity; when a row arrives without
//! one, the node id stands in for it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical node identifier assigned by the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Stable physical-sensor identity, preserved through curation
/// independently of logical node numbering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleIdentity(pub String);

impl SampleIdentity {
    /// Resolve the effective identity for a curated row: the explicit
    /// upstream identity when present, else the node id. Never null.
    pub fn resolve(explicit: Option<&SampleIdentity>, node: &NodeId) -> SampleIdentity {
        match explicit {
            Some(id) => id.clone(),
            None => SampleIdentity(node.0.clone()),
        }
    }
}

impl fmt::Display for SampleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SampleIdentity {
    fn from(s: &str) -> Self {
        SampleIdentity(s.to_string())
    }
}

/// Cycle ID for correlating one curation cycle's log lines.
///
/// Format: `cycle-<date>-<time>-<random>`
/// Example: `cycle-20260115-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(pub String);

impl CycleId {
    /// Generate a new cycle ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random: String = uuid::Uuid::new_v4()
            .to_string()
            .chars()
            .take(6)
            .collect();
        CycleId(format!(
            "cycle-{}-{}",
            now.format("%Y%m%d-%H%M%S"),
            random
        ))
    }

    /// Parse an existing cycle ID string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("cycle-") && s.len() > 21 {
            Some(CycleId(s.to_string()))
        } else {
            None
        }
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
