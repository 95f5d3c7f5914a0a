//! # Gear Graph
//!
//! The per-request gear table plus its adjacency list.
//!
//! | Module    | Role                                                   |
//! |-----------|--------------------------------------------------------|
//! | `builder` | raw records → typed `GearGraph`                        |
//! | `compat`  | mesh compatibility, geometry checks, direction table   |
//! | `cycle`   | whole-graph cycle detection                            |
//!
//! Gear ids are dense (`0..node_count`), so nodes and adjacency are plain
//! vectors indexed by `GearId::index()`.

pub mod builder;
pub mod compat;
pub mod cycle;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::model::*;

pub use builder::build;
pub use cycle::{ensure_acyclic, find_cycle};

/// Downstream ids of one gear, in `connects` order.
pub type Neighbors = SmallVec<[GearId; 4]>;

/// A gear train for one calculation.
#[derive(Debug, Clone, Default)]
pub struct GearGraph {
    nodes: Vec<GearNode>,
    adjacency: Vec<Neighbors>,
    overrides: HashMap<MeshEdge, f64>,
    unit: LengthUnit,
    torque_unit: TorqueUnit,
    warnings: Vec<String>,
}

impl GearGraph {
    pub fn new(unit: LengthUnit, torque_unit: TorqueUnit) -> Self {
        Self { unit, torque_unit, ..Self::default() }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Append a gear. Its id is reassigned to its position in the table.
    pub fn add_node(&mut self, mut node: GearNode) -> GearId {
        let id = GearId(self.nodes.len() as u32);
        node.id = id;
        self.nodes.push(node);
        self.adjacency.push(Neighbors::new());
        id
    }

    /// Add `from → to`. Both ends must already exist.
    pub fn add_edge(&mut self, from: GearId, to: GearId) -> bool {
        if from.index() >= self.nodes.len() || to.index() >= self.nodes.len() {
            return false;
        }
        self.adjacency[from.index()].push(to);
        true
    }

    /// Pin the mesh efficiency of one edge.
    pub fn set_override(&mut self, edge: MeshEdge, efficiency: f64) {
        self.overrides.insert(edge, efficiency);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = String>) {
        self.warnings.extend(warnings);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum()
    }

    pub fn node(&self, id: GearId) -> Option<&GearNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: GearId) -> Option<&mut GearNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes(&self) -> &[GearNode] {
        &self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = GearId> + use<> {
        (0..self.nodes.len() as u32).map(GearId)
    }

    /// Downstream gears of `id`, in submitted order. Empty for unknown ids.
    pub fn neighbors(&self, id: GearId) -> &[GearId] {
        self.adjacency.get(id.index()).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// Every edge, grouped by driver in id order, then in `connects` order.
    pub fn edges(&self) -> impl Iterator<Item = MeshEdge> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, tos)| tos.iter().map(move |to| MeshEdge::new(GearId(from as u32), *to)))
    }

    pub fn has_edge(&self, edge: MeshEdge) -> bool {
        self.neighbors(edge.from).contains(&edge.to)
    }

    pub fn override_for(&self, edge: MeshEdge) -> Option<f64> {
        self.overrides.get(&edge).copied()
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn torque_unit(&self) -> TorqueUnit {
        self.torque_unit
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}
