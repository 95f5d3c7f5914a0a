//! Graph builder: raw gear records → typed [`GearGraph`].
//!
//! Hard failures (missing type, uncoercible teeth/radius, empty gear list)
//! are `ValidationError`s naming `gears[i].field`. Everything lenient
//! (dropped `connects` tokens, dangling ids, unusable overrides) is recorded
//! as a warning on the graph instead.

use tracing::debug;

use super::GearGraph;
use crate::config::EngineConfig;
use crate::model::*;
use crate::{Error, Result};

/// Build the gear graph for `request`.
pub fn build(request: &CalculationRequest, config: &EngineConfig) -> Result<GearGraph> {
    if request.gears.is_empty() {
        return Err(Error::ValidationError("root gear 0 is missing: gears list is empty".into()));
    }

    let mut graph = GearGraph::new(request.unit, request.torque_unit);
    let gear_count = request.gears.len();

    for (i, record) in request.gears.iter().enumerate() {
        let node = build_node(i, record, request.unit, config, &mut graph)?;
        graph.add_node(node);
    }

    for (i, record) in request.gears.iter().enumerate() {
        let Some(connects) = &record.connects else { continue };
        let from = GearId(i as u32);
        for target in connects.ids() {
            if target < 0 || target as usize >= gear_count {
                graph.push_warning(format!("gear {i} connects to unknown gear {target}; connection ignored"));
                continue;
            }
            graph.add_edge(from, GearId(target as u32));
        }
    }

    for (j, record) in request.edges.iter().enumerate() {
        apply_override(j, record, config, &mut graph);
    }

    debug!(
        gears = graph.node_count(),
        edges = graph.edge_count(),
        warnings = graph.warnings().len(),
        "gear graph built"
    );
    Ok(graph)
}

fn build_node(
    i: usize,
    record: &GearRecord,
    unit: LengthUnit,
    config: &EngineConfig,
    graph: &mut GearGraph,
) -> Result<GearNode> {
    let gear_type: GearType = record
        .gear_type
        .as_deref()
        .ok_or_else(|| invalid(i, "type", "missing required field"))?
        .parse()
        .map_err(|e: Error| invalid(i, "type", &message_of(e)))?;

    let teeth = match coerce(i, "teeth", record.teeth.as_ref())? {
        FieldValue::Absent => return Err(invalid(i, "teeth", "missing required field")),
        FieldValue::Zero => 0,
        FieldValue::Value(v) if v > 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => v as u32,
        FieldValue::Value(v) => {
            return Err(invalid(i, "teeth", &format!("{v} is not a whole number of teeth")));
        }
    };

    let radius_user = match coerce(i, "radius", record.radius.as_ref())? {
        FieldValue::Absent => return Err(invalid(i, "radius", "missing required field")),
        FieldValue::Zero => 0.0,
        FieldValue::Value(v) if v > 0.0 => v,
        FieldValue::Value(v) => return Err(invalid(i, "radius", &format!("{v} is negative"))),
    };

    // Optional fields degrade to their fallback instead of failing the request.
    let module_field = lenient(i, "module", record.module.as_ref(), graph);
    let module = match module_field {
        FieldValue::Value(m) => m,
        FieldValue::Absent | FieldValue::Zero if teeth == 0 => 0.0,
        FieldValue::Absent | FieldValue::Zero => radius_user / teeth as f64,
    };

    let efficiency = lenient(i, "meshEfficiency", record.mesh_efficiency.as_ref(), graph)
        .as_f64()
        .and_then(|e| config.accept_efficiency(e))
        .unwrap_or(config.default_mesh_efficiency);

    let pressure_angle = lenient(i, "pressureAngle", record.pressure_angle.as_ref(), graph)
        .nonzero_or(GearNode::DEFAULT_PRESSURE_ANGLE);
    let helix_angle = lenient(i, "helixAngle", record.helix_angle.as_ref(), graph)
        .as_f64()
        .unwrap_or(0.0);
    let helix_hand = lenient_choice::<HelixHand>(i, "helixHand", record.helix_hand.as_deref(), graph);
    let role = lenient_choice::<MeshRole>(i, "role", record.role.as_deref(), graph)
        .unwrap_or(MeshRole::for_type(gear_type));

    Ok(GearNode::new(GearId(i as u32), gear_type, teeth)
        .with_radius_mm(unit.to_mm(radius_user))
        .with_module(module)
        .with_mesh_efficiency(efficiency)
        .with_pressure_angle(pressure_angle)
        .with_helix(helix_angle, helix_hand)
        .with_role(role))
}

fn apply_override(j: usize, record: &EdgeRecord, config: &EngineConfig, graph: &mut GearGraph) {
    let edge = MeshEdge::from((record.from, record.to));
    if !graph.has_edge(edge) {
        graph.push_warning(format!("edges[{j}]: no mesh {edge} in the gear list; override ignored"));
        return;
    }
    match FieldValue::coerce(record.mesh_efficiency.as_ref()) {
        Ok(FieldValue::Absent) => {}
        Ok(value) => match value.as_f64().and_then(|e| config.accept_efficiency(e)) {
            Some(efficiency) => graph.set_override(edge, efficiency),
            None => graph.push_warning(format!(
                "edges[{j}]: mesh efficiency outside (0, {}] on {edge}; override ignored",
                config.max_mesh_efficiency
            )),
        },
        Err(msg) => graph.push_warning(format!("edges[{j}].meshEfficiency: {msg}; override ignored")),
    }
}

fn coerce(i: usize, field: &str, raw: Option<&RawNumber>) -> Result<FieldValue> {
    FieldValue::coerce(raw).map_err(|msg| invalid(i, field, &msg))
}

/// Coerce an optional field; unusable values become `Absent` plus a warning.
fn lenient(i: usize, field: &str, raw: Option<&RawNumber>, graph: &mut GearGraph) -> FieldValue {
    FieldValue::coerce(raw).unwrap_or_else(|msg| {
        graph.push_warning(format!("gears[{i}].{field}: {msg}; using default"));
        FieldValue::Absent
    })
}

/// Parse an optional keyword field; unknown keywords become `None` plus a warning.
fn lenient_choice<T>(i: usize, field: &str, raw: Option<&str>, graph: &mut GearGraph) -> Option<T>
where
    T: std::str::FromStr<Err = Error>,
{
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            graph.push_warning(format!("gears[{i}].{field}: {}; using default", message_of(e)));
            None
        }
    }
}

fn invalid(i: usize, field: &str, msg: &str) -> Error {
    Error::ValidationError(format!("gears[{i}].{field}: {msg}"))
}

fn message_of(e: Error) -> String {
    match e {
        Error::ValidationError(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(gears: serde_json::Value) -> CalculationRequest {
        CalculationRequest::from_json(&json!({"torqueInput": 10, "rpmInput": 1000, "gears": gears}))
            .unwrap()
    }

    #[test]
    fn test_builds_nodes_and_adjacency() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10, "connects": "1, 2"},
            {"type": "Spur", "teeth": 40, "radius": 20},
            {"type": "Helical", "teeth": 30, "radius": 15},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.neighbors(GearId(0)), &[GearId(1), GearId(2)]);
        assert!(g.warnings().is_empty());
    }

    #[test]
    fn test_module_falls_back_to_radius_over_teeth() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10},
            {"type": "Spur", "teeth": 20, "radius": 10, "module": 0},
            {"type": "Spur", "teeth": 20, "radius": 10, "module": 2.0},
            {"type": "Spur", "teeth": 0, "radius": 10},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.node(GearId(0)).unwrap().module, 0.5);
        assert_eq!(g.node(GearId(1)).unwrap().module, 0.5);
        assert_eq!(g.node(GearId(2)).unwrap().module, 2.0);
        assert_eq!(g.node(GearId(3)).unwrap().module, 0.0);
    }

    #[test]
    fn test_radius_is_canonical_mm() {
        let req = CalculationRequest::from_json(&json!({
            "unit": "cm",
            "torqueInput": 1,
            "gears": [{"type": "Spur", "teeth": 20, "radius": 2.5}]
        }))
        .unwrap();
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.node(GearId(0)).unwrap().radius_mm, 25.0);
        // module stays in the submitted unit
        assert_eq!(g.node(GearId(0)).unwrap().module, 0.125);
    }

    #[test]
    fn test_out_of_range_efficiency_uses_default() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10, "meshEfficiency": 2.5},
            {"type": "Spur", "teeth": 20, "radius": 10, "meshEfficiency": 0},
            {"type": "Spur", "teeth": 20, "radius": 10, "meshEfficiency": 1.5},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.node(GearId(0)).unwrap().mesh_efficiency, 0.98);
        assert_eq!(g.node(GearId(1)).unwrap().mesh_efficiency, 0.98);
        assert_eq!(g.node(GearId(2)).unwrap().mesh_efficiency, 1.5);
    }

    #[test]
    fn test_uncoercible_teeth_names_index() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10},
            {"type": "Spur", "teeth": "many", "radius": 10},
        ]));
        let err = build(&req, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(err.to_string().contains("gears[1].teeth"), "{err}");
    }

    #[test]
    fn test_missing_radius_is_rejected() {
        let req = request(json!([{"type": "Spur", "teeth": 20}]));
        let err = build(&req, &EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("gears[0].radius"), "{err}");
    }

    #[test]
    fn test_fractional_teeth_rejected() {
        let req = request(json!([{"type": "Spur", "teeth": 20.5, "radius": 10}]));
        assert!(build(&req, &EngineConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_type_names_index() {
        let req = request(json!([{"type": "Hypoid", "teeth": 20, "radius": 10}]));
        let err = build(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: gears[0].type: unknown gear type 'Hypoid'");
    }

    #[test]
    fn test_empty_gear_list_is_missing_root() {
        let req = request(json!([]));
        let err = build(&req, &EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("root gear 0"));
    }

    #[test]
    fn test_dangling_connection_is_warning() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10, "connects": [1, 7, -1]},
            {"type": "Spur", "teeth": 20, "radius": 10},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.neighbors(GearId(0)), &[GearId(1)]);
        assert_eq!(g.warnings().len(), 2);
        assert!(g.warnings()[0].contains("unknown gear 7"));
    }

    #[test]
    fn test_edge_overrides() {
        let req = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [
                {"type": "Spur", "teeth": 20, "radius": 10, "connects": "1"},
                {"type": "Spur", "teeth": 40, "radius": 20},
            ],
            "edges": [
                {"from": 0, "to": 1, "meshEfficiency": 0.95},
                {"from": 1, "to": 0, "meshEfficiency": 0.5},
                {"from": 0, "to": 1, "meshEfficiency": 3.0},
            ]
        }))
        .unwrap();
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.override_for(MeshEdge::from((0, 1))), Some(0.95));
        assert_eq!(g.warnings().len(), 2);
    }

    #[test]
    fn test_bad_optional_field_degrades_with_warning() {
        let req = request(json!([
            {"type": "Spur", "teeth": 20, "radius": 10, "module": "n/a"},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        assert_eq!(g.node(GearId(0)).unwrap().module, 0.5);
        assert!(g.warnings()[0].starts_with("gears[0].module"));
    }

    #[test]
    fn test_mesh_geometry_fields() {
        let req = request(json!([
            {"type": "Helical", "teeth": 20, "radius": 10, "pressureAngle": 25,
             "helixAngle": "15", "helixHand": "right"},
            {"type": "Spur", "teeth": 20, "radius": 10, "pressureAngle": 0, "role": "internal"},
            {"type": "Internal", "teeth": 60, "radius": 30},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        let helical = g.node(GearId(0)).unwrap();
        assert_eq!(helical.pressure_angle, 25.0);
        assert_eq!(helical.helix_angle, 15.0);
        assert_eq!(helical.helix_hand, Some(HelixHand::Right));
        assert_eq!(helical.role, MeshRole::External);

        let spur = g.node(GearId(1)).unwrap();
        assert_eq!(spur.pressure_angle, 20.0);
        assert_eq!(spur.helix_hand, None);
        assert_eq!(spur.role, MeshRole::Internal);

        assert_eq!(g.node(GearId(2)).unwrap().role, MeshRole::Internal);
        assert!(g.warnings().is_empty());
    }

    #[test]
    fn test_unknown_helix_hand_degrades_with_warning() {
        let req = request(json!([
            {"type": "Helical", "teeth": 20, "radius": 10, "helixHand": "up", "role": "Outer"},
        ]));
        let g = build(&req, &EngineConfig::default()).unwrap();
        let node = g.node(GearId(0)).unwrap();
        assert_eq!(node.helix_hand, None);
        assert_eq!(node.role, MeshRole::External);
        assert_eq!(g.warnings().len(), 2);
        assert!(g.warnings()[0].starts_with("gears[0].helixHand: unknown helix hand 'up'"));
        assert!(g.warnings()[1].starts_with("gears[0].role"));
    }
}
