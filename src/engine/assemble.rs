//! Result assembler: resolved graph → [`CalculationReport`].
//!
//! Pure projection. Radii go back to the request's length unit, torques to
//! its torque unit; nothing is validated here.

use std::collections::BTreeMap;

use crate::graph::GearGraph;
use crate::model::*;

pub fn assemble(graph: &GearGraph, results: Vec<EdgeResult>, warnings: Vec<String>) -> CalculationReport {
    let unit = graph.unit();
    let torque_unit = graph.torque_unit();

    let results = results
        .into_iter()
        .map(|r| EdgeResult { torque: torque_unit.from_nm(r.torque), ..r })
        .collect();

    let gear_states: BTreeMap<GearId, GearStateView> = graph
        .nodes()
        .iter()
        .map(|node| {
            let view = node
                .state
                .map(|s| GearStateView::from(PropagatedState { torque: torque_unit.from_nm(s.torque), ..s }))
                .unwrap_or_default();
            (node.id, view)
        })
        .collect();

    let module_summary = graph
        .nodes()
        .iter()
        .map(|node| ModuleSummary {
            gear: node.id,
            module: node.module,
            radius_user: unit.from_mm(node.radius_mm),
            radius_unit: unit,
            teeth: node.teeth,
        })
        .collect();

    CalculationReport { results, gear_states, module_summary, warnings, torque_unit }
}
