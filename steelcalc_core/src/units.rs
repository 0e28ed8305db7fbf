//! # Unit Types
//!
//! Newtype wrappers for the units the apparatus inputs arrive in and the SI
//! units the formulas run in. Conversions go one way, into the units the
//! formulas and reports use. They serialize as bare numbers.
//!
//! ## Input vs SI
//!
//! - Pressure: megapascals (lance), atmospheres (nozzle) -> pascals
//! - Length: millimeters -> meters
//! - Temperature: degrees Celsius -> kelvin
//! - Area: square meters -> square millimeters (for reporting)
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::units::{Atmospheres, Celsius, Kelvin, Pascals};
//!
//! let p: Pascals = Atmospheres(10.0).into();
//! assert_eq!(p.0, 1_013_250.0);
//!
//! let t: Kelvin = Celsius(25.0).into();
//! assert!((t.0 - 298.15).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Standard atmosphere in pascals
pub const PA_PER_ATM: f64 = 101_325.0;

/// Offset between the Celsius and Kelvin scales
pub const KELVIN_OFFSET: f64 = 273.15;

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in pascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Pressure in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegaPascals(pub f64);

/// Pressure in standard atmospheres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Atmospheres(pub f64);

impl From<MegaPascals> for Pascals {
    fn from(mpa: MegaPascals) -> Self {
        Pascals(mpa.0 * 1e6)
    }
}

impl From<Atmospheres> for Pascals {
    fn from(atm: Atmospheres) -> Self {
        Pascals(atm.0 * PA_PER_ATM)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

// ============================================================================
// Temperature Units
// ============================================================================

/// Absolute temperature in kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kelvin(pub f64);

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Self {
        Kelvin(c.0 + KELVIN_OFFSET)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMeters(pub f64);

/// Area in square millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMillimeters(pub f64);

impl From<SqMeters> for SqMillimeters {
    fn from(m2: SqMeters) -> Self {
        SqMillimeters(m2.0 * 1e6)
    }
}

// ============================================================================
// Ratios
// ============================================================================

/// Percentage (0-100)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    /// Convert to a fraction in [0, 1]
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Pascals);
impl_arithmetic!(MegaPascals);
impl_arithmetic!(Atmospheres);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Kelvin);
impl_arithmetic!(SqMeters);
impl_arithmetic!(SqMillimeters);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megapascals_to_pascals() {
        let pa: Pascals = MegaPascals(2.5).into();
        assert_eq!(pa.0, 2.5e6);
    }

    #[test]
    fn test_atmospheres_to_pascals() {
        let pa: Pascals = Atmospheres(1.0).into();
        assert_eq!(pa.0, 101_325.0);
    }

    #[test]
    fn test_millimeters_to_meters() {
        let m: Meters = Millimeters(15.0).into();
        assert!((m.0 - 0.015).abs() < 1e-15);
    }

    #[test]
    fn test_celsius_to_kelvin() {
        let k: Kelvin = Celsius(-273.15).into();
        assert!(k.0.abs() < 1e-12);
    }

    #[test]
    fn test_area_conversion() {
        let mm2: SqMillimeters = SqMeters(0.0004).into();
        assert!((mm2.0 - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_fraction() {
        assert_eq!(Percent(99.5).fraction(), 0.995);
    }

    #[test]
    fn test_arithmetic() {
        let a = Pascals(10.0);
        let b = Pascals(4.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).value(), 20.0);
    }

    #[test]
    fn test_serialization() {
        let k = Kelvin(300.0);
        assert_eq!(serde_json::to_string(&k).unwrap(), "300.0");
    }
}
