//! Gear node in the gear train graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Gear identifier: the gear's position in the submitted `gears` list.
///
/// Id 0 is always the root (input) gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearId(pub u32);

impl GearId {
    pub const ROOT: GearId = GearId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for GearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gear geometry family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GearType {
    Spur,
    Helical,
    Bevel,
    Miter,
    SpiralBevel,
    Worm,
    Rack,
    Internal,
}

impl GearType {
    pub const ALL: [GearType; 8] = [
        GearType::Spur,
        GearType::Helical,
        GearType::Bevel,
        GearType::Miter,
        GearType::SpiralBevel,
        GearType::Worm,
        GearType::Rack,
        GearType::Internal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GearType::Spur => "Spur",
            GearType::Helical => "Helical",
            GearType::Bevel => "Bevel",
            GearType::Miter => "Miter",
            GearType::SpiralBevel => "SpiralBevel",
            GearType::Worm => "Worm",
            GearType::Rack => "Rack",
            GearType::Internal => "Internal",
        }
    }

    pub fn is_worm(self) -> bool {
        matches!(self, GearType::Worm)
    }

    pub fn is_internal(self) -> bool {
        matches!(self, GearType::Internal)
    }
}

impl FromStr for GearType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(*c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "spur" => Ok(GearType::Spur),
            "helical" => Ok(GearType::Helical),
            "bevel" => Ok(GearType::Bevel),
            "miter" | "mitre" => Ok(GearType::Miter),
            "spiralbevel" => Ok(GearType::SpiralBevel),
            "worm" => Ok(GearType::Worm),
            "rack" => Ok(GearType::Rack),
            "internal" => Ok(GearType::Internal),
            _ => Err(Error::ValidationError(format!("unknown gear type '{}'", s.trim()))),
        }
    }
}

impl fmt::Display for GearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rotation sense, seen from the same reference side for every gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "CW")]
    Clockwise,
    #[serde(rename = "CCW")]
    CounterClockwise,
}

impl Direction {
    /// +1 for clockwise, -1 for counter-clockwise.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Clockwise => "CW",
            Direction::CounterClockwise => "CCW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Helix hand of a helical gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelixHand {
    #[serde(rename = "RH")]
    Right,
    #[serde(rename = "LH")]
    Left,
}

impl FromStr for HelixHand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rh" | "right" => Ok(HelixHand::Right),
            "lh" | "left" => Ok(HelixHand::Left),
            _ => Err(Error::ValidationError(format!("unknown helix hand '{}'", s.trim()))),
        }
    }
}

impl fmt::Display for HelixHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HelixHand::Right => "RH",
            HelixHand::Left => "LH",
        })
    }
}

/// Which side of the mesh the teeth are cut on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeshRole {
    #[default]
    External,
    Internal,
}

impl MeshRole {
    pub fn for_type(gear_type: GearType) -> Self {
        if gear_type.is_internal() { MeshRole::Internal } else { MeshRole::External }
    }
}

impl FromStr for MeshRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" => Ok(MeshRole::External),
            "internal" => Ok(MeshRole::Internal),
            _ => Err(Error::ValidationError(format!("unknown mesh role '{}'", s.trim()))),
        }
    }
}

/// Speed, torque and direction written onto a gear by the propagation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagatedState {
    pub rpm: f64,
    /// Newton-metres.
    pub torque: f64,
    pub direction: Direction,
}

/// A gear in the train.
///
/// Geometry is fixed at build time. `state` starts as `None` and is written
/// exactly once, by whichever edge reaches the gear first.
#[derive(Debug, Clone, PartialEq)]
pub struct GearNode {
    pub id: GearId,
    pub gear_type: GearType,
    pub teeth: u32,
    /// Pitch radius, canonical millimetres.
    pub radius_mm: f64,
    /// Module in the request's length unit.
    pub module: f64,
    pub mesh_efficiency: f64,
    /// Degrees.
    pub pressure_angle: f64,
    /// Degrees; 0 for straight-cut gears.
    pub helix_angle: f64,
    pub helix_hand: Option<HelixHand>,
    pub role: MeshRole,
    pub state: Option<PropagatedState>,
}

impl GearNode {
    pub const DEFAULT_PRESSURE_ANGLE: f64 = 20.0;

    pub fn new(id: GearId, gear_type: GearType, teeth: u32) -> Self {
        Self {
            id,
            gear_type,
            teeth,
            radius_mm: 0.0,
            module: 0.0,
            mesh_efficiency: 0.0,
            pressure_angle: Self::DEFAULT_PRESSURE_ANGLE,
            helix_angle: 0.0,
            helix_hand: None,
            role: MeshRole::for_type(gear_type),
            state: None,
        }
    }

    pub fn with_radius_mm(mut self, radius_mm: f64) -> Self {
        self.radius_mm = radius_mm;
        self
    }

    pub fn with_module(mut self, module: f64) -> Self {
        self.module = module;
        self
    }

    pub fn with_mesh_efficiency(mut self, efficiency: f64) -> Self {
        self.mesh_efficiency = efficiency;
        self
    }

    pub fn with_pressure_angle(mut self, degrees: f64) -> Self {
        self.pressure_angle = degrees;
        self
    }

    pub fn with_helix(mut self, degrees: f64, hand: Option<HelixHand>) -> Self {
        self.helix_angle = degrees;
        self.helix_hand = hand;
        self
    }

    pub fn with_role(mut self, role: MeshRole) -> Self {
        self.role = role;
        self
    }

    /// True when the teeth face inward, either by type or by declared role.
    pub fn is_internal_mesh(&self) -> bool {
        self.gear_type.is_internal() || self.role == MeshRole::Internal
    }
}
