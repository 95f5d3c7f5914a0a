//! Breadth-first propagation of speed, torque and direction from gear 0.
//!
//! Per edge `n → m`:
//!
//! ```text
//! rpm_m    = rpm_n    * teeth_n / teeth_m
//! torque_m = torque_n * teeth_m / teeth_n * efficiency(n → m)
//! dir_m    = inverts(type_n, type_m) ? -dir_n : dir_n
//! ```
//!
//! The first edge to reach a gear fixes its state. Later edges into the same
//! gear still produce a result row (`applied: false`) but leave the gear
//! alone, so the FIFO order of the queue and of each `connects` list decides
//! the outcome for gears reachable along more than one path.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::graph::{GearGraph, compat};
use crate::model::*;
use crate::{Error, Result};

/// External drive applied to the root gear. Torque is in newton-metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootInput {
    pub rpm: f64,
    pub torque_nm: f64,
}

/// Walks a [`GearGraph`] and resolves every gear reachable from the root.
pub struct PropagationEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> PropagationEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Propagate `input` through `graph`.
    ///
    /// On success every reachable gear carries its state and the edge results
    /// are returned in traversal order. On failure `graph` is left untouched.
    pub fn run(&self, graph: &mut GearGraph, input: RootInput) -> Result<Vec<EdgeResult>> {
        if graph.node(GearId::ROOT).is_none() {
            return Err(Error::ValidationError("root gear 0 is missing".into()));
        }

        let mut states: Vec<Option<PropagatedState>> = vec![None; graph.node_count()];
        states[GearId::ROOT.index()] = Some(PropagatedState {
            rpm: input.rpm,
            torque: input.torque_nm,
            direction: Direction::Clockwise,
        });

        let mut results = Vec::with_capacity(graph.edge_count());
        let mut queue = VecDeque::from([GearId::ROOT]);

        while let Some(n) = queue.pop_front() {
            let Some(driver_state) = states[n.index()] else { continue };
            let Some(driver) = graph.node(n) else { continue };

            for &m in graph.neighbors(n) {
                let Some(driven) = graph.node(m) else { continue };
                let edge = MeshEdge::new(n, m);
                let result = self.mesh(graph, edge, driver, driven, driver_state)?;

                let applied = states[m.index()].is_none();
                if applied {
                    states[m.index()] = Some(PropagatedState {
                        rpm: result.rpm,
                        torque: result.torque,
                        direction: result.direction,
                    });
                    queue.push_back(m);
                } else {
                    trace!(%edge, "gear already resolved; first writer wins");
                }
                results.push(EdgeResult { applied, ..result });
            }
        }

        for (node_state, id) in states.into_iter().zip(0u32..) {
            if let Some(node) = graph.node_mut(GearId(id)) {
                node.state = node_state;
            }
        }

        debug!(
            edges = results.len(),
            applied = results.iter().filter(|r| r.applied).count(),
            "propagation complete"
        );
        Ok(results)
    }

    /// Transform the driver's state across one mesh.
    fn mesh(
        &self,
        graph: &GearGraph,
        edge: MeshEdge,
        driver: &GearNode,
        driven: &GearNode,
        state: PropagatedState,
    ) -> Result<EdgeResult> {
        if driver.teeth == 0 || driven.teeth == 0 {
            return Err(Error::ComputationError(format!(
                "zero teeth on edge {edge} (gear {} has {}, gear {} has {})",
                driver.id, driver.teeth, driven.id, driven.teeth
            )));
        }

        let efficiency = self.efficiency(graph, edge, driver);
        let teeth_n = driver.teeth as f64;
        let teeth_m = driven.teeth as f64;

        let direction = if compat::inverts_direction(driver.gear_type, driven.gear_type) {
            state.direction.reversed()
        } else {
            state.direction
        };

        Ok(EdgeResult {
            from: edge.from,
            to: edge.to,
            rpm: state.rpm * (teeth_n / teeth_m),
            torque: state.torque * (teeth_m / teeth_n) * efficiency,
            mesh_efficiency: efficiency,
            direction,
            applied: true,
        })
    }

    /// Edge override → driving gear's own efficiency → configured default.
    fn efficiency(&self, graph: &GearGraph, edge: MeshEdge, driver: &GearNode) -> f64 {
        graph
            .override_for(edge)
            .or_else(|| self.config.accept_efficiency(driver.mesh_efficiency))
            .unwrap_or(self.config.default_mesh_efficiency)
    }
}
