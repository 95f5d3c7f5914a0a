//! Calculation pipeline.
//!
//! ```text
//! request → build graph → mesh checks (warnings) → cycle check → propagate → assemble
//! ```
//!
//! Synchronous and self-contained: every call owns its graph, so concurrent
//! calls need no coordination.

pub mod propagate;
pub mod assemble;

use tracing::debug;

use crate::config::EngineConfig;
use crate::graph::{self, compat};
use crate::model::{CalculationReport, CalculationRequest};
use crate::Result;

pub use propagate::{PropagationEngine, RootInput};
pub use assemble::assemble;

/// Run one calculation end to end.
pub fn run(request: &CalculationRequest, config: &EngineConfig) -> Result<CalculationReport> {
    let mut graph = graph::build(request, config)?;

    let mesh_warnings = compat::scan(&graph, config);
    graph.extend_warnings(mesh_warnings);

    graph::ensure_acyclic(&graph)?;

    let input = RootInput {
        rpm: request.rpm_input.unwrap_or(config.default_rpm),
        torque_nm: request.torque_unit.to_nm(request.torque_input),
    };
    debug!(rpm = input.rpm, torque_nm = input.torque_nm, "propagating from root gear");
    let results = PropagationEngine::new(config).run(&mut graph, input)?;

    let warnings = graph.take_warnings();
    Ok(assemble(&graph, results, warnings))
}

/// Decode `value` and run it.
pub fn run_json(value: &serde_json::Value, config: &EngineConfig) -> Result<CalculationReport> {
    let request = CalculationRequest::from_json(value)?;
    run(&request, config)
}
