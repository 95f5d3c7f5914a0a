//! CSV export of a calculation report.
//!
//! Two blocks separated by an empty line: one row per traversed edge, then
//! one row per gear.
//!
//! ```text
//! from,to,rpm,torque,meshEfficiency,direction,applied
//! 0,1,500,19,0.95,CCW,true
//!
//! gear,rpm,torque,direction
//! 0,1000,10,CW
//! 1,500,19,CCW
//! ```
//!
//! Torques are in the report's torque unit. Gears the traversal never reached
//! get empty cells.

use std::io::Write;

use crate::model::*;
use crate::Result;

pub const EDGE_HEADER: &str = "from,to,rpm,torque,meshEfficiency,direction,applied";
pub const GEAR_HEADER: &str = "gear,rpm,torque,direction";

/// Write `report` as CSV.
pub fn export_csv(report: &CalculationReport, writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "{EDGE_HEADER}")?;
    for r in &report.results {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            r.from, r.to, r.rpm, r.torque, r.mesh_efficiency, r.direction.label(), r.applied,
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "{GEAR_HEADER}")?;
    for (id, state) in &report.gear_states {
        writeln!(
            writer,
            "{},{},{},{}",
            id,
            cell(state.rpm),
            cell(state.torque),
            state.direction.map(Direction::label).unwrap_or_default(),
        )?;
    }
    Ok(())
}

/// Render `report` into a `String`.
pub fn to_csv_string(report: &CalculationReport) -> Result<String> {
    let mut buf = Vec::new();
    export_csv(report, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::Error::StorageError(format!("csv output is not UTF-8: {e}")))
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> CalculationReport {
        let mut report = CalculationReport::default();
        report.results.push(EdgeResult {
            from: GearId(0),
            to: GearId(1),
            rpm: 500.0,
            torque: 19.0,
            mesh_efficiency: 0.95,
            direction: Direction::CounterClockwise,
            applied: true,
        });
        report.gear_states.insert(
            GearId(0),
            GearStateView { rpm: Some(1000.0), torque: Some(10.0), direction: Some(Direction::Clockwise) },
        );
        report.gear_states.insert(
            GearId(1),
            GearStateView { rpm: Some(500.0), torque: Some(19.0), direction: Some(Direction::CounterClockwise) },
        );
        report.gear_states.insert(GearId(2), GearStateView::default());
        report
    }

    #[test]
    fn test_two_block_layout() {
        let csv = to_csv_string(&report()).unwrap();
        let expected = "\
from,to,rpm,torque,meshEfficiency,direction,applied
0,1,500,19,0.95,CCW,true

gear,rpm,torque,direction
0,1000,10,CW
1,500,19,CCW
2,,,
";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_empty_report_keeps_headers() {
        let csv = to_csv_string(&CalculationReport::default()).unwrap();
        assert_eq!(csv, format!("{EDGE_HEADER}\n\n{GEAR_HEADER}\n"));
    }
}
