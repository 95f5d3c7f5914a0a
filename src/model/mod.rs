//! # Gear Train Model
//!
//! Plain data that crosses every boundary: request decoding ↔ graph builder
//! ↔ propagation engine ↔ report ↔ caller.
//!
//! Design rule: no graph algorithms and no I/O here. Everything in this
//! module is constructed per request and dropped with the response.

pub mod gear;
pub mod edge;
pub mod units;
pub mod request;
pub mod report;

pub use gear::{GearId, GearType, GearNode, Direction, PropagatedState, HelixHand, MeshRole};
pub use edge::MeshEdge;
pub use units::{LengthUnit, TorqueUnit};
pub use request::{CalculationRequest, GearRecord, EdgeRecord, RawNumber, FieldValue, Connects};
pub use report::{CalculationReport, EdgeResult, GearStateView, ModuleSummary};
