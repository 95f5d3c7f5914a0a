//! Property tests over randomly shaped gear trees.
//!
//! Every generated train is a tree rooted at gear 0 (each gear `i > 0` hangs
//! off a parent `< i`), so it is acyclic and fully reachable.

use gearmatrix::{CalculationReport, CalculationRequest, Direction, EngineConfig, GearId, GearRecord};
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// `(teeth, parent)` per gear; the root's parent is ignored.
fn tree() -> impl Strategy<Value = Vec<(u32, usize)>> {
    prop::collection::vec((1u32..200, any::<prop::sample::Index>()), 1..24).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (teeth, idx))| (teeth, if i == 0 { 0 } else { idx.index(i) }))
            .collect()
    })
}

fn request(gears: &[(u32, usize)], rpm: f64, torque: f64) -> CalculationRequest {
    let mut children = vec![Vec::new(); gears.len()];
    for (i, &(_, parent)) in gears.iter().enumerate().skip(1) {
        children[parent].push(i as u32);
    }
    gears.iter().zip(children).fold(CalculationRequest::new(rpm, torque), |req, (&(teeth, _), kids)| {
        req.with_gear(GearRecord::new("Spur", teeth, teeth as f64).connects(kids))
    })
}

fn run(req: &CalculationRequest) -> CalculationReport {
    gearmatrix::engine::run(req, &EngineConfig::default()).unwrap()
}

proptest! {
    #[test]
    fn prop_every_gear_of_a_tree_resolves(gears in tree(), rpm in 1.0f64..5000.0, torque in 0.1f64..500.0) {
        let report = run(&request(&gears, rpm, torque));
        prop_assert_eq!(report.results.len(), gears.len() - 1);
        prop_assert!(report.results.iter().all(|r| r.applied));
        prop_assert!(report.gear_states.values().all(|s| s.is_resolved()));
    }

    #[test]
    fn prop_rpm_times_teeth_is_conserved(gears in tree(), rpm in 1.0f64..5000.0) {
        let report = run(&request(&gears, rpm, 10.0));
        for r in &report.results {
            let driver = report.gear_state(r.from).unwrap().rpm.unwrap();
            let teeth_n = gears[r.from.0 as usize].0 as f64;
            let teeth_m = gears[r.to.0 as usize].0 as f64;
            prop_assert!(close(r.rpm * teeth_m, driver * teeth_n), "{} -> {}", r.from, r.to);
        }
    }

    #[test]
    fn prop_torque_never_exceeds_lossless(gears in tree(), torque in 0.1f64..500.0) {
        let report = run(&request(&gears, 1000.0, torque));
        for r in &report.results {
            let driver = report.gear_state(r.from).unwrap().torque.unwrap();
            let teeth_n = gears[r.from.0 as usize].0 as f64;
            let teeth_m = gears[r.to.0 as usize].0 as f64;
            let lossless = driver * teeth_m / teeth_n;
            prop_assert!(r.torque <= lossless * (1.0 + 1e-12));
            prop_assert!(close(r.torque, lossless * r.mesh_efficiency));
        }
    }

    #[test]
    fn prop_spur_direction_follows_depth_parity(gears in tree()) {
        let report = run(&request(&gears, 1000.0, 10.0));
        let mut depth = vec![0usize; gears.len()];
        for i in 1..gears.len() {
            depth[i] = depth[gears[i].1] + 1;
        }
        for (i, d) in depth.iter().enumerate() {
            let expected = if d % 2 == 0 { Direction::Clockwise } else { Direction::CounterClockwise };
            prop_assert_eq!(report.gear_state(GearId(i as u32)).unwrap().direction, Some(expected));
        }
    }

    #[test]
    fn prop_runs_are_identical(gears in tree(), rpm in 1.0f64..5000.0) {
        let req = request(&gears, rpm, 10.0);
        let a = serde_json::to_string(&run(&req)).unwrap();
        let b = serde_json::to_string(&run(&req)).unwrap();
        prop_assert_eq!(a, b);
    }
}
