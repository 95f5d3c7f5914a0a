//! Calculation request as submitted by a client.
//!
//! Field values arrive loosely typed: numbers may be JSON numbers or numeric
//! strings, `connects` may be a delimited string or a list. Decoding keeps
//! the raw shapes; [`crate::graph::builder`] does the coercion and reports
//! the offending `gears[i].field` when it fails.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::units::{LengthUnit, TorqueUnit};
use crate::{Error, Result};

// ============================================================================
// Loosely typed scalars
// ============================================================================

/// A numeric field as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(Json),
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<u32> for RawNumber {
    fn from(v: u32) -> Self {
        RawNumber::Number(v as f64)
    }
}

impl From<&str> for RawNumber {
    fn from(v: &str) -> Self {
        RawNumber::Text(v.to_string())
    }
}

/// Tri-state view of an optional numeric field.
///
/// `Zero` is kept apart from `Absent` so callers can decide per field
/// whether an explicit zero means "use the fallback".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Absent,
    Zero,
    Value(f64),
}

impl FieldValue {
    /// Coerce a raw field. Empty strings count as absent.
    pub fn coerce(raw: Option<&RawNumber>) -> std::result::Result<Self, String> {
        let n = match raw {
            None => return Ok(FieldValue::Absent),
            Some(RawNumber::Number(n)) => *n,
            Some(RawNumber::Text(s)) if s.trim().is_empty() => return Ok(FieldValue::Absent),
            Some(RawNumber::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", s.trim()))?,
            Some(RawNumber::Other(Json::Null)) => return Ok(FieldValue::Absent),
            Some(RawNumber::Other(v)) => return Err(format!("{v} is not a number")),
        };
        if !n.is_finite() {
            return Err(format!("{n} is not a finite number"));
        }
        Ok(if n == 0.0 { FieldValue::Zero } else { FieldValue::Value(n) })
    }

    /// The value, or `fallback` for both `Absent` and `Zero`.
    pub fn nonzero_or(self, fallback: f64) -> f64 {
        match self {
            FieldValue::Value(v) => v,
            FieldValue::Absent | FieldValue::Zero => fallback,
        }
    }

    /// The numeric value, treating `Zero` as 0.0. `None` when absent.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Zero => Some(0.0),
            FieldValue::Value(v) => Some(v),
        }
    }
}

/// Downstream gear ids of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Connects {
    Text(String),
    List(Vec<RawNumber>),
    /// A single bare id.
    Id(f64),
}

impl Connects {
    /// Parsed ids in submitted order. Tokens that are not whole numbers are
    /// dropped.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            Connects::Text(s) => s
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter_map(|tok| parse_id(tok.trim()))
                .collect(),
            Connects::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    RawNumber::Number(n) if n.fract() == 0.0 => Some(*n as i64),
                    RawNumber::Text(s) => parse_id(s.trim()),
                    _ => None,
                })
                .collect(),
            Connects::Id(n) if n.fract() == 0.0 => vec![*n as i64],
            Connects::Id(_) => Vec::new(),
        }
    }
}

fn parse_id(tok: &str) -> Option<i64> {
    if tok.is_empty() {
        return None;
    }
    tok.parse::<i64>().ok()
}

impl From<Vec<u32>> for Connects {
    fn from(ids: Vec<u32>) -> Self {
        Connects::List(ids.into_iter().map(RawNumber::from).collect())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One entry of the request's `gears` list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearRecord {
    #[serde(rename = "type", default)]
    pub gear_type: Option<String>,
    #[serde(default)]
    pub teeth: Option<RawNumber>,
    #[serde(default, alias = "pitchRadius")]
    pub radius: Option<RawNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<RawNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_efficiency: Option<RawNumber>,
    /// Degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_angle: Option<RawNumber>,
    /// Degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helix_angle: Option<RawNumber>,
    /// `RH` or `LH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helix_hand: Option<String>,
    /// `External` or `Internal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "connectsTo", skip_serializing_if = "Option::is_none")]
    pub connects: Option<Connects>,
}

impl GearRecord {
    pub fn new(gear_type: &str, teeth: u32, radius: f64) -> Self {
        Self {
            gear_type: Some(gear_type.to_string()),
            teeth: Some(teeth.into()),
            radius: Some(radius.into()),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: f64) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_mesh_efficiency(mut self, efficiency: f64) -> Self {
        self.mesh_efficiency = Some(efficiency.into());
        self
    }

    pub fn connects(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.connects = Some(Connects::from(ids.into_iter().collect::<Vec<_>>()));
        self
    }
}

/// Per-edge mesh efficiency override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub from: u32,
    pub to: u32,
    #[serde(default)]
    pub mesh_efficiency: Option<RawNumber>,
}

// ============================================================================
// Request
// ============================================================================

/// A complete calculation request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    #[serde(default)]
    pub unit: LengthUnit,
    #[serde(default)]
    pub torque_unit: TorqueUnit,
    /// Falls back to the engine's configured default speed when absent.
    #[serde(default)]
    pub rpm_input: Option<f64>,
    pub torque_input: f64,
    pub gears: Vec<GearRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl CalculationRequest {
    pub fn new(rpm_input: f64, torque_input: f64) -> Self {
        Self {
            rpm_input: Some(rpm_input),
            torque_input,
            ..Self::default()
        }
    }

    pub fn with_units(mut self, unit: LengthUnit, torque_unit: TorqueUnit) -> Self {
        self.unit = unit;
        self.torque_unit = torque_unit;
        self
    }

    pub fn with_gear(mut self, gear: GearRecord) -> Self {
        self.gears.push(gear);
        self
    }

    pub fn with_edge_efficiency(mut self, from: u32, to: u32, efficiency: f64) -> Self {
        self.edges.push(EdgeRecord { from, to, mesh_efficiency: Some(efficiency.into()) });
        self
    }

    /// Decode a request from an arbitrary JSON document, naming the offending
    /// field on failure.
    pub fn from_json(value: &Json) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::ValidationError("request body must be a JSON object".into()))?;

        let unit = match obj.get("unit") {
            None | Some(Json::Null) => LengthUnit::default(),
            Some(Json::String(s)) => s.parse()?,
            Some(other) => {
                return Err(Error::ValidationError(format!("unit: expected a unit code, got {other}")));
            }
        };
        let torque_unit = match obj.get("torqueUnit") {
            None | Some(Json::Null) => TorqueUnit::default(),
            Some(Json::String(s)) => s.parse()?,
            Some(other) => {
                return Err(Error::ValidationError(format!(
                    "torqueUnit: expected a unit code, got {other}"
                )));
            }
        };

        let rpm_input = scalar_field(obj.get("rpmInput"), "rpmInput")?.as_f64();
        let torque_input = scalar_field(obj.get("torqueInput"), "torqueInput")?
            .as_f64()
            .ok_or_else(|| Error::ValidationError("torqueInput: missing required field".into()))?;

        let gears = match obj.get("gears") {
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_gear(i, item))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::ValidationError("gears must be a list".into())),
            None => return Err(Error::ValidationError("gears: missing required field".into())),
        };

        let edges = match obj.get("edges") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    EdgeRecord::deserialize(item)
                        .map_err(|e| Error::ValidationError(format!("edges[{i}]: {e}")))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::ValidationError("edges must be a list".into())),
        };

        Ok(Self { unit, torque_unit, rpm_input, torque_input, gears, edges })
    }
}

/// Decode one gear record field by field so a failure names `gears[i].field`.
fn decode_gear(i: usize, item: &Json) -> Result<GearRecord> {
    let obj = item
        .as_object()
        .ok_or_else(|| Error::ValidationError(format!("gears[{i}]: expected an object, got {item}")))?;
    Ok(GearRecord {
        gear_type: record_field(i, obj, &["type"])?,
        teeth: record_field(i, obj, &["teeth"])?,
        radius: record_field(i, obj, &["radius", "pitchRadius"])?,
        module: record_field(i, obj, &["module"])?,
        mesh_efficiency: record_field(i, obj, &["meshEfficiency"])?,
        pressure_angle: record_field(i, obj, &["pressureAngle"])?,
        helix_angle: record_field(i, obj, &["helixAngle"])?,
        helix_hand: record_field(i, obj, &["helixHand"])?,
        role: record_field(i, obj, &["role"])?,
        connects: record_field(i, obj, &["connects", "connectsTo"])?,
    })
}

/// First present name wins; `null` reads as absent.
fn record_field<T: DeserializeOwned>(i: usize, obj: &Map<String, Json>, names: &[&str]) -> Result<Option<T>> {
    let Some((name, value)) = names.iter().find_map(|name| obj.get(*name).map(|v| (*name, v))) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    T::deserialize(value)
        .map(Some)
        .map_err(|e| Error::ValidationError(format!("gears[{i}].{name}: {e}")))
}

fn scalar_field(raw: Option<&Json>, field: &str) -> Result<FieldValue> {
    let raw = match raw {
        None => None,
        Some(v) => Some(
            RawNumber::deserialize(v).map_err(|e| Error::ValidationError(format!("{field}: {e}")))?,
        ),
    };
    FieldValue::coerce(raw.as_ref()).map_err(|msg| Error::ValidationError(format!("{field}: {msg}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_tri_state() {
        assert_eq!(FieldValue::coerce(None), Ok(FieldValue::Absent));
        assert_eq!(FieldValue::coerce(Some(&RawNumber::Number(0.0))), Ok(FieldValue::Zero));
        assert_eq!(FieldValue::coerce(Some(&RawNumber::from("  "))), Ok(FieldValue::Absent));
        assert_eq!(FieldValue::coerce(Some(&RawNumber::from("2.5"))), Ok(FieldValue::Value(2.5)));
        assert!(FieldValue::coerce(Some(&RawNumber::from("abc"))).is_err());
        assert!(FieldValue::coerce(Some(&RawNumber::Other(json!(true)))).is_err());
    }

    #[test]
    fn test_zero_and_absent_share_fallback() {
        assert_eq!(FieldValue::Zero.nonzero_or(0.98), 0.98);
        assert_eq!(FieldValue::Absent.nonzero_or(0.98), 0.98);
        assert_eq!(FieldValue::Value(0.9).nonzero_or(0.98), 0.9);
    }

    #[test]
    fn test_connects_string_drops_non_numeric_tokens() {
        let c = Connects::Text("1, two, 3;4  x".into());
        assert_eq!(c.ids(), vec![1, 3, 4]);
    }

    #[test]
    fn test_connects_list_accepts_numbers_and_strings() {
        let c: Connects = serde_json::from_value(json!([2, "3", "z", 1.5])).unwrap();
        assert_eq!(c.ids(), vec![2, 3]);
    }

    #[test]
    fn test_from_json_rejects_non_list_gears() {
        let err = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": "not a list"
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: gears must be a list");
    }

    #[test]
    fn test_from_json_names_bad_record() {
        let err = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [{"type": "Spur", "teeth": 20, "radius": 10}, 42]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("gears[1]"), "{err}");
    }

    #[test]
    fn test_from_json_names_bad_field() {
        let err = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [{"type": "Spur", "teeth": 20, "radius": 10, "connects": true}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("gears[0].connects"), "{err}");

        let err = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [{"type": 3, "teeth": 20, "radius": 10}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("gears[0].type"), "{err}");
    }

    #[test]
    fn test_connects_accepts_bare_id() {
        let req = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [
                {"type": "Spur", "teeth": 20, "radius": 10, "connects": 1},
                {"type": "Spur", "teeth": 40, "radius": 20, "connects": 2.5}
            ]
        }))
        .unwrap();
        assert_eq!(req.gears[0].connects.as_ref().map(Connects::ids), Some(vec![1]));
        assert_eq!(req.gears[1].connects.as_ref().map(Connects::ids), Some(vec![]));
    }

    #[test]
    fn test_from_json_reads_helix_fields() {
        let req = CalculationRequest::from_json(&json!({
            "torqueInput": 10,
            "gears": [{
                "type": "Helical", "teeth": 20, "pitchRadius": 10,
                "pressureAngle": "14.5", "helixAngle": 30, "helixHand": "LH", "role": null
            }]
        }))
        .unwrap();
        let gear = &req.gears[0];
        assert_eq!(gear.radius, Some(RawNumber::Number(10.0)));
        assert_eq!(gear.pressure_angle, Some(RawNumber::from("14.5")));
        assert_eq!(gear.helix_angle, Some(RawNumber::Number(30.0)));
        assert_eq!(gear.helix_hand.as_deref(), Some("LH"));
        assert_eq!(gear.role, None);
    }

    #[test]
    fn test_from_json_defaults() {
        let req = CalculationRequest::from_json(&json!({
            "torqueInput": "12.5",
            "gears": [{"type": "Spur", "teeth": "20", "radius": 10, "connectsTo": "1"}]
        }))
        .unwrap();
        assert_eq!(req.unit, LengthUnit::Millimeter);
        assert_eq!(req.torque_unit, TorqueUnit::NewtonMeter);
        assert_eq!(req.rpm_input, None);
        assert_eq!(req.torque_input, 12.5);
        assert_eq!(req.gears[0].connects.as_ref().map(Connects::ids), Some(vec![1]));
    }

    #[test]
    fn test_from_json_requires_torque() {
        let err = CalculationRequest::from_json(&json!({"gears": []})).unwrap_err();
        assert!(err.to_string().contains("torqueInput"));
    }
}
