//! Mesh pairing tables.
//!
//! Two static tables keyed by gear type:
//!
//! - **compatibility**: which types a gear may mesh with. A mismatch is only
//!   ever a warning; the engine computes regardless.
//! - **direction**: whether the driven gear turns opposite to its driver.
//!
//! Plus the per-edge geometry checks: module, pressure angle, helix angle and
//! hand, centre distance, and ratio.

use tracing::warn;

use super::GearGraph;
use crate::config::EngineConfig;
use crate::model::{GearNode, GearType, MeshEdge, MeshRole};

const BEVEL_FAMILY: &[GearType] = &[GearType::Bevel, GearType::Miter, GearType::SpiralBevel];

/// Types `t` may drive.
pub fn mesh_partners(t: GearType) -> &'static [GearType] {
    match t {
        GearType::Spur => &[GearType::Spur, GearType::Helical, GearType::Rack, GearType::Internal],
        GearType::Helical => &[GearType::Helical, GearType::Spur, GearType::Rack, GearType::Internal],
        GearType::Bevel | GearType::Miter | GearType::SpiralBevel => BEVEL_FAMILY,
        GearType::Worm => &[GearType::Spur],
        GearType::Rack => &[],
        GearType::Internal => &[GearType::Spur, GearType::Helical],
    }
}

/// `true` when either side lists the other as a partner.
pub fn is_compatible(a: GearType, b: GearType) -> bool {
    mesh_partners(a).contains(&b) || mesh_partners(b).contains(&a)
}

/// Whether the driven gear turns opposite to its driver.
///
/// Internal gears keep the driver's sense. Otherwise every mesh inverts,
/// worm meshes included.
pub fn inverts_direction(driver: GearType, driven: GearType) -> bool {
    !(driver.is_internal() || driven.is_internal())
}

/// Check every edge of `graph` and return the warnings in edge order.
pub fn scan(graph: &GearGraph, config: &EngineConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.node(edge.from), graph.node(edge.to)) else {
            continue;
        };
        if !is_compatible(a.gear_type, b.gear_type) {
            warnings.push(format!(
                "gear {} ({}) is not mesh-compatible with gear {} ({})",
                a.id, a.gear_type, b.id, b.gear_type
            ));
        }
        let checks = [
            module_mismatch(edge, a, b, config),
            pressure_angle_mismatch(edge, a, b, config),
            helix_angle_mismatch(edge, a, b, config),
            helix_hand_mismatch(edge, a, b),
            invalid_centre_distance(edge, a, b),
            excessive_ratio(edge, a, b, config),
        ];
        warnings.extend(checks.into_iter().flatten());
    }
    for w in &warnings {
        warn!(warning = %w, "mesh check");
    }
    warnings
}

fn module_mismatch(edge: MeshEdge, a: &GearNode, b: &GearNode, config: &EngineConfig) -> Option<String> {
    if a.module <= 0.0 || b.module <= 0.0 {
        return None;
    }
    ((a.module - b.module).abs() > config.module_tolerance).then(|| {
        format!("module mismatch on {edge}: m={} vs m={}", a.module, b.module)
    })
}

fn pressure_angle_mismatch(edge: MeshEdge, a: &GearNode, b: &GearNode, config: &EngineConfig) -> Option<String> {
    ((a.pressure_angle - b.pressure_angle).abs() > config.angle_tolerance).then(|| {
        format!(
            "pressure angle mismatch on {edge}: {}° vs {}°",
            a.pressure_angle, b.pressure_angle
        )
    })
}

fn helix_angle_mismatch(edge: MeshEdge, a: &GearNode, b: &GearNode, config: &EngineConfig) -> Option<String> {
    let helical = a.gear_type == GearType::Helical || b.gear_type == GearType::Helical;
    (helical && (a.helix_angle - b.helix_angle).abs() > config.angle_tolerance).then(|| {
        format!("helix angle mismatch on {edge}: {}° vs {}°", a.helix_angle, b.helix_angle)
    })
}

/// External helical pairs must be cut opposite-handed. Only checked when both
/// hands were declared.
fn helix_hand_mismatch(edge: MeshEdge, a: &GearNode, b: &GearNode) -> Option<String> {
    if a.gear_type != GearType::Helical || b.gear_type != GearType::Helical {
        return None;
    }
    if a.role != MeshRole::External || b.role != MeshRole::External {
        return None;
    }
    match (a.helix_hand, b.helix_hand) {
        (Some(ha), Some(hb)) if ha == hb => Some(format!(
            "helix hand mismatch on {edge}: external helical gears must be opposite-handed, both are {ha}"
        )),
        _ => None,
    }
}

/// Centre distance from the pitch radii: the difference for an internal mesh,
/// the sum otherwise. It must come out positive.
fn invalid_centre_distance(edge: MeshEdge, a: &GearNode, b: &GearNode) -> Option<String> {
    let internal = a.is_internal_mesh() || b.is_internal_mesh();
    let centre = if internal { (b.radius_mm - a.radius_mm).abs() } else { a.radius_mm + b.radius_mm };
    (centre <= 0.0).then(|| {
        format!(
            "invalid centre distance on {edge}: {centre} mm from radii {} and {} mm",
            a.radius_mm, b.radius_mm
        )
    })
}

fn excessive_ratio(edge: MeshEdge, a: &GearNode, b: &GearNode, config: &EngineConfig) -> Option<String> {
    if a.gear_type.is_worm() || b.gear_type.is_worm() || a.radius_mm <= 0.0 || b.radius_mm <= 0.0 {
        return None;
    }
    let ratio = a.radius_mm.max(b.radius_mm) / a.radius_mm.min(b.radius_mm);
    (ratio > config.ratio_warning_threshold).then(|| {
        format!(
            "excessive gear ratio on {edge}: {ratio:.2} exceeds {}",
            config.ratio_warning_threshold
        )
    })
}
