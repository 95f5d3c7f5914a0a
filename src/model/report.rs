//! Calculation report returned to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Direction, GearId, LengthUnit, PropagatedState, TorqueUnit};

/// Outcome of one traversed mesh edge, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResult {
    pub from: GearId,
    pub to: GearId,
    pub rpm: f64,
    pub torque: f64,
    pub mesh_efficiency: f64,
    pub direction: Direction,
    /// `false` when the driven gear had already been resolved by an earlier
    /// edge; the values are what this edge would have produced.
    pub applied: bool,
}

/// Final state of one gear. All fields are `None` for gears the traversal
/// never reached.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GearStateView {
    pub rpm: Option<f64>,
    pub torque: Option<f64>,
    pub direction: Option<Direction>,
}

impl GearStateView {
    pub fn is_resolved(&self) -> bool {
        self.rpm.is_some()
    }
}

impl From<PropagatedState> for GearStateView {
    fn from(s: PropagatedState) -> Self {
        Self { rpm: Some(s.rpm), torque: Some(s.torque), direction: Some(s.direction) }
    }
}

/// Geometry of one gear, expressed in the request's length unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub gear: GearId,
    pub module: f64,
    pub radius_user: f64,
    pub radius_unit: LengthUnit,
    pub teeth: u32,
}

/// The full response of a calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub results: Vec<EdgeResult>,
    pub gear_states: BTreeMap<GearId, GearStateView>,
    pub module_summary: Vec<ModuleSummary>,
    pub warnings: Vec<String>,
    /// Unit of every torque value in this report.
    pub torque_unit: TorqueUnit,
}

impl CalculationReport {
    pub fn gear_state(&self, id: GearId) -> Option<&GearStateView> {
        self.gear_states.get(&id)
    }

    /// The result row that wrote `to`'s state, if any.
    pub fn applied_edge_into(&self, to: GearId) -> Option<&EdgeResult> {
        self.results.iter().find(|r| r.to == to && r.applied)
    }
}
