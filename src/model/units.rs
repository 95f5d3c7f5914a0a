//! Length and torque units.
//!
//! Internally every length is millimetres and every torque is newton-metres.
//! These helpers translate the unit codes a request carries to and from
//! those canonical units. Pure functions, no state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Length unit a request expresses radii in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
}

impl LengthUnit {
    /// Millimetres per one of this unit.
    pub fn mm_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Centimeter => 10.0,
            LengthUnit::Meter => 1000.0,
            LengthUnit::Inch => 25.4,
            LengthUnit::Foot => 304.8,
        }
    }

    pub fn to_mm(self, value: f64) -> f64 {
        value * self.mm_per_unit()
    }

    pub fn from_mm(self, mm: f64) -> f64 {
        mm / self.mm_per_unit()
    }

    pub fn code(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mm" | "millimeter" | "millimetre" => Ok(LengthUnit::Millimeter),
            "cm" | "centimeter" | "centimetre" => Ok(LengthUnit::Centimeter),
            "m" | "meter" | "metre" => Ok(LengthUnit::Meter),
            "in" | "inch" | "\"" => Ok(LengthUnit::Inch),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Foot),
            other => Err(Error::ValidationError(format!("unit: unknown length unit '{other}'"))),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Torque unit a request expresses the input torque in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TorqueUnit {
    #[default]
    #[serde(rename = "Nm")]
    NewtonMeter,
    #[serde(rename = "Nmm")]
    NewtonMillimeter,
    #[serde(rename = "kNm")]
    KilonewtonMeter,
    #[serde(rename = "lbft")]
    PoundFoot,
    #[serde(rename = "lbin")]
    PoundInch,
}

impl TorqueUnit {
    /// Newton-metres per one of this unit.
    pub fn nm_per_unit(self) -> f64 {
        match self {
            TorqueUnit::NewtonMeter => 1.0,
            TorqueUnit::NewtonMillimeter => 0.001,
            TorqueUnit::KilonewtonMeter => 1000.0,
            TorqueUnit::PoundFoot => 1.355_817_948_331_400_4,
            TorqueUnit::PoundInch => 0.112_984_829_027_616_7,
        }
    }

    pub fn to_nm(self, value: f64) -> f64 {
        value * self.nm_per_unit()
    }

    pub fn from_nm(self, nm: f64) -> f64 {
        nm / self.nm_per_unit()
    }

    pub fn code(self) -> &'static str {
        match self {
            TorqueUnit::NewtonMeter => "Nm",
            TorqueUnit::NewtonMillimeter => "Nmm",
            TorqueUnit::KilonewtonMeter => "kNm",
            TorqueUnit::PoundFoot => "lbft",
            TorqueUnit::PoundInch => "lbin",
        }
    }
}

impl FromStr for TorqueUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(*c, '.' | '·' | '-' | '*' | ' ' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" | "nm" => Ok(TorqueUnit::NewtonMeter),
            "nmm" => Ok(TorqueUnit::NewtonMillimeter),
            "knm" => Ok(TorqueUnit::KilonewtonMeter),
            "lbft" | "lbfft" | "ftlb" | "ftlbf" => Ok(TorqueUnit::PoundFoot),
            "lbin" | "lbfin" | "inlb" | "inlbf" => Ok(TorqueUnit::PoundInch),
            _ => Err(Error::ValidationError(format!("torqueUnit: unknown torque unit '{}'", s.trim()))),
        }
    }
}

impl fmt::Display for TorqueUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
