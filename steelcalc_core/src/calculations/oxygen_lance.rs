//! # Oxygen Lance Calculation
//!
//! Jet parameters of a top-blown oxygen lance: exit velocity, jet impact
//! force, Mach and Reynolds numbers, and a simplified efficiency score.
//!
//! ## Assumptions
//!
//! - Oxygen treated as an ideal gas, γ = 1.4, M = 0.032 kg/mol
//! - Fixed nozzle pressure ratio Pe/P = 0.1
//! - Fixed dynamic viscosity μ = 2.0e-5 Pa·s
//! - Exit velocity scaled linearly by oxygen purity
//!
//! These are simplified engineering approximations. Changing any of them
//! changes stored results.
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::calculations::oxygen_lance::{calculate, OxygenLanceInput};
//!
//! let input = OxygenLanceInput::new(1500.0, 2.5, 15.0, 25.0, "Steel 45");
//! let result = calculate(&input).unwrap();
//!
//! assert!(result.exit_velocity_mps > 0.0);
//! assert!(result.mach_number > 1.0);
//! println!("{}", result.notes);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::gases::{GAMMA_O2, MOLAR_MASS_O2, R_UNIVERSAL};
use super::require_finite;
use crate::codec::{require, ParameterMap};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Celsius, Kelvin, MegaPascals, Meters, Millimeters, Pascals, Percent};

/// Nozzle pressure ratio Pe/P used for the exit velocity
pub const PRESSURE_RATIO: f64 = 0.1;

/// Dynamic viscosity of oxygen, Pa·s
pub const OXYGEN_VISCOSITY_PA_S: f64 = 2.0e-5;

/// Default oxygen purity, %
pub const DEFAULT_PURITY_PCT: f64 = 99.5;

/// Efficiency ceiling, %
const MAX_EFFICIENCY_PCT: f64 = 95.0;

/// Below this efficiency a purity warning is emitted, %
const LOW_EFFICIENCY_PCT: f64 = 85.0;

/// Reynolds number above which the jet is reported turbulent
const TURBULENT_REYNOLDS: f64 = 4000.0;

/// Lowest temperature accepted by validation, °C
const MIN_TEMPERATURE_C: f64 = -273.0;

fn default_purity() -> f64 {
    DEFAULT_PURITY_PCT
}

/// Input parameters for an oxygen lance.
///
/// ## JSON Example
///
/// ```json
/// {
///   "oxygen_flow_rate_m3h": 1500.0,
///   "pressure_mpa": 2.5,
///   "nozzle_diameter_mm": 15.0,
///   "temperature_c": 25.0,
///   "oxygen_purity_pct": 99.5,
///   "material_name": "Steel 45"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxygenLanceInput {
    /// Oxygen flow rate G, m³/h
    pub oxygen_flow_rate_m3h: f64,

    /// Supply pressure P, MPa
    pub pressure_mpa: f64,

    /// Nozzle diameter d, mm
    pub nozzle_diameter_mm: f64,

    /// Oxygen temperature T, °C
    pub temperature_c: f64,

    /// Oxygen purity, % (defaults to 99.5)
    #[serde(default = "default_purity")]
    pub oxygen_purity_pct: f64,

    /// Lance material, informational only
    #[serde(default)]
    pub material_name: String,
}

impl OxygenLanceInput {
    /// Create an input with the default oxygen purity of 99.5 %.
    pub fn new(
        oxygen_flow_rate_m3h: f64,
        pressure_mpa: f64,
        nozzle_diameter_mm: f64,
        temperature_c: f64,
        material_name: impl Into<String>,
    ) -> Self {
        OxygenLanceInput {
            oxygen_flow_rate_m3h,
            pressure_mpa,
            nozzle_diameter_mm,
            temperature_c,
            oxygen_purity_pct: DEFAULT_PURITY_PCT,
            material_name: material_name.into(),
        }
    }

    /// Set the oxygen purity, %
    pub fn with_purity(mut self, oxygen_purity_pct: f64) -> Self {
        self.oxygen_purity_pct = oxygen_purity_pct;
        self
    }

    /// Validate input parameters.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("oxygen_flow_rate_m3h", self.oxygen_flow_rate_m3h)?;
        require_finite("pressure_mpa", self.pressure_mpa)?;
        require_finite("nozzle_diameter_mm", self.nozzle_diameter_mm)?;
        require_finite("temperature_c", self.temperature_c)?;
        require_finite("oxygen_purity_pct", self.oxygen_purity_pct)?;

        if self.oxygen_flow_rate_m3h <= 0.0 {
            return Err(CalcError::invalid_input(
                "oxygen_flow_rate_m3h",
                self.oxygen_flow_rate_m3h.to_string(),
                "Oxygen flow rate must be positive",
            ));
        }
        if self.pressure_mpa <= 0.0 {
            return Err(CalcError::invalid_input(
                "pressure_mpa",
                self.pressure_mpa.to_string(),
                "Pressure must be positive",
            ));
        }
        if self.nozzle_diameter_mm <= 0.0 {
            return Err(CalcError::invalid_input(
                "nozzle_diameter_mm",
                self.nozzle_diameter_mm.to_string(),
                "Nozzle diameter must be positive",
            ));
        }
        if self.temperature_c < MIN_TEMPERATURE_C {
            return Err(CalcError::invalid_input(
                "temperature_c",
                self.temperature_c.to_string(),
                "Temperature cannot be below absolute zero",
            ));
        }
        if !(0.0..=100.0).contains(&self.oxygen_purity_pct) {
            return Err(CalcError::invalid_input(
                "oxygen_purity_pct",
                self.oxygen_purity_pct.to_string(),
                "Oxygen purity must be within 0-100%",
            ));
        }
        Ok(())
    }

    /// Storage form, keyed by the exchange parameter names
    pub fn to_parameters(&self) -> ParameterMap {
        ParameterMap::from([
            ("oxygenFlowRate".to_string(), self.oxygen_flow_rate_m3h),
            ("pressure".to_string(), self.pressure_mpa),
            ("nozzleDiameter".to_string(), self.nozzle_diameter_mm),
            ("temperature".to_string(), self.temperature_c),
            ("oxygenPurity".to_string(), self.oxygen_purity_pct),
        ])
    }

    /// Rebuild from a stored parameter map.
    ///
    /// Purity falls back to 99.5 %. The material name is not part of the
    /// map and comes back empty.
    pub fn from_parameters(params: &ParameterMap) -> CalcResult<Self> {
        Ok(OxygenLanceInput {
            oxygen_flow_rate_m3h: require(params, "oxygenFlowRate")?,
            pressure_mpa: require(params, "pressure")?,
            nozzle_diameter_mm: require(params, "nozzleDiameter")?,
            temperature_c: require(params, "temperature")?,
            oxygen_purity_pct: params.get("oxygenPurity").copied().unwrap_or(DEFAULT_PURITY_PCT),
            material_name: String::new(),
        })
    }
}

/// Results from an oxygen lance calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "exit_velocity_mps": 508.72,
///   "jet_force_n": 1475.88,
///   "efficiency_pct": 92.65,
///   "mach_number": 1.545,
///   "reynolds_number": 12312919.7,
///   "gas_density_kg_m3": 32.27,
///   "nozzle_area_m2": 0.000177,
///   "speed_of_sound_mps": 329.32,
///   "recommended_pressure_mpa": 2.75,
///   "notes": "Optimal flow regime.\n..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxygenLanceResult {
    /// Jet exit velocity V, m/s
    pub exit_velocity_mps: f64,

    /// Jet impact force F = ρV²A, N
    pub jet_force_n: f64,

    /// Simplified efficiency score, %
    pub efficiency_pct: f64,

    /// Exit Mach number V/a
    pub mach_number: f64,

    /// Reynolds number ρVd/μ
    pub reynolds_number: f64,

    /// Oxygen density at supply conditions, kg/m³
    pub gas_density_kg_m3: f64,

    /// Nozzle cross-section area, m²
    pub nozzle_area_m2: f64,

    /// Local speed of sound, m/s
    pub speed_of_sound_mps: f64,

    /// Recommended supply pressure (input × 1.1), MPa
    pub recommended_pressure_mpa: f64,

    /// Recommendation notes, one per line
    pub notes: String,
}

impl OxygenLanceResult {
    /// Whether the jet is in the 1 ≤ M ≤ 3 band
    pub fn is_optimal_regime(&self) -> bool {
        (1.0..=3.0).contains(&self.mach_number)
    }

    /// Whether the jet is turbulent (Re > 4000)
    pub fn is_turbulent(&self) -> bool {
        self.reynolds_number > TURBULENT_REYNOLDS
    }

    /// Storage form of the headline results
    pub fn to_parameters(&self) -> ParameterMap {
        ParameterMap::from([
            ("exitVelocity".to_string(), self.exit_velocity_mps),
            ("jetForce".to_string(), self.jet_force_n),
            ("efficiency".to_string(), self.efficiency_pct),
            ("machNumber".to_string(), self.mach_number),
            ("reynoldsNumber".to_string(), self.reynolds_number),
        ])
    }
}

/// Calculate oxygen lance jet parameters.
///
/// # Returns
///
/// * `Ok(OxygenLanceResult)` - Calculation results with notes
/// * `Err(CalcError::InvalidInput)` - If inputs fail validation
pub fn calculate(input: &OxygenLanceInput) -> CalcResult<OxygenLanceResult> {
    input.validate()?;

    let p: Pascals = MegaPascals(input.pressure_mpa).into();
    let d: Meters = Millimeters(input.nozzle_diameter_mm).into();
    let t: Kelvin = Celsius(input.temperature_c).into();
    let purity = Percent(input.oxygen_purity_pct).fraction();

    let r_specific = R_UNIVERSAL / MOLAR_MASS_O2;

    // V = sqrt(2·γ/(γ-1)·Rs·T·(1 - r^((γ-1)/γ)))·φ
    let exit_velocity = (2.0 * (GAMMA_O2 / (GAMMA_O2 - 1.0))
        * r_specific
        * t.0
        * (1.0 - PRESSURE_RATIO.powf((GAMMA_O2 - 1.0) / GAMMA_O2)))
        .sqrt()
        * purity;

    let area = PI * (d.0 / 2.0).powi(2);

    // Ideal gas law
    let density = (p.0 * MOLAR_MASS_O2) / (R_UNIVERSAL * t.0);
    let jet_force = density * exit_velocity.powi(2) * area;

    let speed_of_sound = (GAMMA_O2 * r_specific * t.0).sqrt();
    let mach_number = exit_velocity / speed_of_sound;

    let reynolds_number = (density * exit_velocity * d.0) / OXYGEN_VISCOSITY_PA_S;

    let efficiency = MAX_EFFICIENCY_PCT.min(80.0 + (purity * 15.0) - ((mach_number - 2.0).abs() * 5.0));

    let recommended_pressure_mpa = input.pressure_mpa * 1.1;

    let notes = recommendations(mach_number, efficiency, reynolds_number, recommended_pressure_mpa);

    Ok(OxygenLanceResult {
        exit_velocity_mps: exit_velocity,
        jet_force_n: jet_force,
        efficiency_pct: efficiency,
        mach_number,
        reynolds_number,
        gas_density_kg_m3: density,
        nozzle_area_m2: area,
        speed_of_sound_mps: speed_of_sound,
        recommended_pressure_mpa,
        notes,
    })
}

fn recommendations(mach: f64, efficiency: f64, reynolds: f64, recommended_pressure_mpa: f64) -> String {
    let mut notes = Vec::new();

    if mach < 1.0 {
        notes.push("Warning: subsonic regime. Raise the supply pressure.".to_string());
    } else if mach > 3.0 {
        notes.push("Warning: excessive Mach number. Energy loss risk.".to_string());
    } else {
        notes.push("Optimal flow regime.".to_string());
    }

    if efficiency < LOW_EFFICIENCY_PCT {
        notes.push("Efficiency below optimal. Check oxygen purity.".to_string());
    }

    if reynolds > TURBULENT_REYNOLDS {
        notes.push("Turbulent flow: good bath mixing.".to_string());
    } else {
        notes.push("Laminar flow.".to_string());
    }

    notes.push(format!("Recommended pressure: {:.1} MPa", recommended_pressure_mpa));

    notes.join("\n")
}
