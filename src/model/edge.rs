//! Mesh edge (driver → driven) in the gear train graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GearId;

/// A directed mesh: `from` drives `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshEdge {
    pub from: GearId,
    pub to: GearId,
}

impl MeshEdge {
    pub fn new(from: GearId, to: GearId) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for MeshEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl From<(u32, u32)> for MeshEdge {
    fn from((from, to): (u32, u32)) -> Self {
        Self::new(GearId(from), GearId(to))
    }
}
