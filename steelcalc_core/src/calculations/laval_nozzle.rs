//! # Laval Nozzle Calculation
//!
//! Converging-diverging nozzle sizing from stagnation conditions: throat and
//! exit areas, exit velocity and Mach number, thrust and efficiency.
//!
//! ## Assumptions
//!
//! - Isentropic ideal-gas flow, properties from [`GasProperties`]
//! - Choked throat (critical conditions at A*)
//! - Subsonic regime approximated as V = 0.7·a*
//! - Ambient back pressure 1 atm
//! - Ideal thrust approximated as ṁ·2a*
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::calculations::laval_nozzle::{calculate, LavalNozzleInput};
//!
//! let input = LavalNozzleInput {
//!     gas_type: "Oxygen".to_string(),
//!     inlet_pressure_atm: 10.0,
//!     outlet_pressure_atm: 1.0,
//!     temperature_k: 300.0,
//!     mass_flow_rate_kg_s: 1.0,
//!     expansion_ratio: 5.0,
//!     is_supersonic: true,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!(result.mach_number > 1.0);
//! ```

use serde::{Deserialize, Serialize};

use super::gases::GasProperties;
use super::require_finite;
use crate::codec::{require, ParameterMap};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Atmospheres, Pascals, SqMeters, SqMillimeters, PA_PER_ATM};

/// Ambient back pressure, Pa
pub const AMBIENT_PRESSURE_PA: f64 = PA_PER_ATM;

/// Subsonic exit velocity as a fraction of the critical velocity
pub const SUBSONIC_VELOCITY_FACTOR: f64 = 0.7;

/// Efficiency ceiling, %
const MAX_EFFICIENCY_PCT: f64 = 98.0;

/// Below this efficiency an expansion-ratio warning is emitted, %
const LOW_EFFICIENCY_PCT: f64 = 90.0;

/// Subsonic nozzles above this exit Mach are flagged as near-sonic
const NEAR_SONIC_MACH: f64 = 0.8;

/// Allowed deviation from the optimal expansion ratio
const EXPANSION_RATIO_TOLERANCE: f64 = 2.0;

/// Stored parameter holding the working gas adiabatic index
pub const GAMMA_KEY: &str = "gamma";

/// Stored parameter holding the working gas molar mass, kg/mol
pub const MOLAR_MASS_KEY: &str = "molarMass";

fn default_gas() -> String {
    "Oxygen".to_string()
}

/// Input parameters for a Laval nozzle.
///
/// ## JSON Example
///
/// ```json
/// {
///   "gas_type": "Oxygen",
///   "inlet_pressure_atm": 10.0,
///   "outlet_pressure_atm": 1.0,
///   "temperature_k": 300.0,
///   "mass_flow_rate_kg_s": 1.0,
///   "expansion_ratio": 5.0,
///   "is_supersonic": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LavalNozzleInput {
    /// Working gas name, matched case-insensitively
    #[serde(default = "default_gas")]
    pub gas_type: String,

    /// Stagnation (inlet) pressure P0, atm
    pub inlet_pressure_atm: f64,

    /// Exit pressure Pe, atm
    pub outlet_pressure_atm: f64,

    /// Stagnation temperature T0, K
    pub temperature_k: f64,

    /// Mass flow rate ṁ, kg/s
    pub mass_flow_rate_kg_s: f64,

    /// Expansion ratio ε = Ae/A*
    pub expansion_ratio: f64,

    /// Requested flow regime
    pub is_supersonic: bool,
}

impl LavalNozzleInput {
    /// Validate input parameters.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("inlet_pressure_atm", self.inlet_pressure_atm)?;
        require_finite("outlet_pressure_atm", self.outlet_pressure_atm)?;
        require_finite("temperature_k", self.temperature_k)?;
        require_finite("mass_flow_rate_kg_s", self.mass_flow_rate_kg_s)?;
        require_finite("expansion_ratio", self.expansion_ratio)?;

        if self.inlet_pressure_atm <= 0.0 {
            return Err(CalcError::invalid_input(
                "inlet_pressure_atm",
                self.inlet_pressure_atm.to_string(),
                "Inlet pressure must be positive",
            ));
        }
        if self.outlet_pressure_atm <= 0.0 {
            return Err(CalcError::invalid_input(
                "outlet_pressure_atm",
                self.outlet_pressure_atm.to_string(),
                "Outlet pressure must be positive",
            ));
        }
        if self.inlet_pressure_atm <= self.outlet_pressure_atm {
            return Err(CalcError::invalid_input(
                "inlet_pressure_atm",
                format!("{} <= {}", self.inlet_pressure_atm, self.outlet_pressure_atm),
                "Inlet pressure must be greater than outlet pressure",
            ));
        }
        if self.temperature_k <= 0.0 {
            return Err(CalcError::invalid_input(
                "temperature_k",
                self.temperature_k.to_string(),
                "Temperature must be positive",
            ));
        }
        if self.mass_flow_rate_kg_s <= 0.0 {
            return Err(CalcError::invalid_input(
                "mass_flow_rate_kg_s",
                self.mass_flow_rate_kg_s.to_string(),
                "Mass flow rate must be positive",
            ));
        }
        if self.expansion_ratio < 1.0 {
            return Err(CalcError::invalid_input(
                "expansion_ratio",
                self.expansion_ratio.to_string(),
                "Expansion ratio must be at least 1",
            ));
        }
        Ok(())
    }

    /// Expansion ratio matching the pressure ratio, √(P0/Pe)
    pub fn optimal_expansion_ratio(&self) -> f64 {
        (self.inlet_pressure_atm / self.outlet_pressure_atm).sqrt()
    }

    /// Storage form; the regime flag is stored as 1.0 / 0.0 and the gas as
    /// its `gamma` and `molarMass`
    pub fn to_parameters(&self) -> ParameterMap {
        let gas = GasProperties::for_gas(&self.gas_type);
        ParameterMap::from([
            (GAMMA_KEY.to_string(), gas.gamma),
            (MOLAR_MASS_KEY.to_string(), gas.molar_mass_kg_mol),
            ("inletPressure".to_string(), self.inlet_pressure_atm),
            ("outletPressure".to_string(), self.outlet_pressure_atm),
            ("temperature".to_string(), self.temperature_k),
            ("massFlowRate".to_string(), self.mass_flow_rate_kg_s),
            ("expansionRatio".to_string(), self.expansion_ratio),
            ("isSupersonic".to_string(), if self.is_supersonic { 1.0 } else { 0.0 }),
        ])
    }

    /// Rebuild from a stored parameter map.
    ///
    /// The gas is recovered from `gamma` and `molarMass`. Maps without them
    /// come back as Oxygen. A missing regime flag reads as subsonic.
    pub fn from_parameters(params: &ParameterMap) -> CalcResult<Self> {
        let gas_type = match (params.get(GAMMA_KEY), params.get(MOLAR_MASS_KEY)) {
            (None, None) => default_gas(),
            (Some(&gamma), Some(&molar_mass_kg_mol)) => {
                let props = GasProperties { gamma, molar_mass_kg_mol };
                GasProperties::name_for(&props)
                    .ok_or_else(|| {
                        CalcError::invalid_input(
                            GAMMA_KEY,
                            format!("{} / {}", gamma, molar_mass_kg_mol),
                            "No tabulated gas has these properties",
                        )
                    })?
                    .to_string()
            }
            (None, Some(_)) => return Err(CalcError::missing_field(GAMMA_KEY)),
            (Some(_), None) => return Err(CalcError::missing_field(MOLAR_MASS_KEY)),
        };

        Ok(LavalNozzleInput {
            gas_type,
            inlet_pressure_atm: require(params, "inletPressure")?,
            outlet_pressure_atm: require(params, "outletPressure")?,
            temperature_k: require(params, "temperature")?,
            mass_flow_rate_kg_s: require(params, "massFlowRate")?,
            expansion_ratio: require(params, "expansionRatio")?,
            is_supersonic: params.get("isSupersonic").is_some_and(|flag| *flag != 0.0),
        })
    }

    /// Whether a stored map records which gas it was computed with
    pub fn has_gas_parameters(params: &ParameterMap) -> bool {
        params.contains_key(GAMMA_KEY) && params.contains_key(MOLAR_MASS_KEY)
    }
}

/// Results from a Laval nozzle calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "throat_area_mm2": 402.41,
///   "exit_area_mm2": 2012.04,
///   "exit_velocity_mps": 512.86,
///   "mach_number": 2.157,
///   "thrust_n": 512.86,
///   "efficiency_pct": 85.03,
///   "critical_pressure_ratio": 0.528,
///   "critical_temperature_k": 250.0,
///   "critical_velocity_mps": 301.56,
///   "optimal_expansion_ratio": 3.16,
///   "notes": "Efficiency below optimal. ..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LavalNozzleResult {
    /// Critical (throat) area A*, mm²
    pub throat_area_mm2: f64,

    /// Exit area Ae = ε·A*, mm²
    pub exit_area_mm2: f64,

    /// Exit velocity Ve, m/s
    pub exit_velocity_mps: f64,

    /// Exit Mach number
    pub mach_number: f64,

    /// Thrust F = ṁ·Ve + (Pe - Pamb)·Ae, N
    pub thrust_n: f64,

    /// Thrust relative to the ideal estimate, %
    pub efficiency_pct: f64,

    /// Critical pressure ratio P*/P0
    pub critical_pressure_ratio: f64,

    /// Critical temperature T*, K
    pub critical_temperature_k: f64,

    /// Critical velocity a*, m/s
    pub critical_velocity_mps: f64,

    /// √(P0/Pe)
    pub optimal_expansion_ratio: f64,

    /// Recommendation notes, one per line
    pub notes: String,
}

impl LavalNozzleResult {
    /// Storage form of the headline results
    pub fn to_parameters(&self) -> ParameterMap {
        ParameterMap::from([
            ("throatArea".to_string(), self.throat_area_mm2),
            ("exitArea".to_string(), self.exit_area_mm2),
            ("exitVelocity".to_string(), self.exit_velocity_mps),
            ("machNumber".to_string(), self.mach_number),
            ("thrust".to_string(), self.thrust_n),
            ("efficiency".to_string(), self.efficiency_pct),
        ])
    }
}

/// Calculate Laval nozzle parameters.
///
/// # Returns
///
/// * `Ok(LavalNozzleResult)` - Calculation results with notes
/// * `Err(CalcError::InvalidInput)` - If inputs fail validation
pub fn calculate(input: &LavalNozzleInput) -> CalcResult<LavalNozzleResult> {
    input.validate()?;

    let gas = GasProperties::for_gas(&input.gas_type);
    let gamma = gas.gamma;
    let r_specific = gas.specific_gas_constant();

    let p0: Pascals = Atmospheres(input.inlet_pressure_atm).into();
    let pe: Pascals = Atmospheres(input.outlet_pressure_atm).into();
    let t0 = input.temperature_k;
    let m_dot = input.mass_flow_rate_kg_s;

    // Throat conditions
    let critical_pressure_ratio = (2.0 / (gamma + 1.0)).powf(gamma / (gamma - 1.0));
    let t_star = t0 * (2.0 / (gamma + 1.0));
    let a_star = (gamma * r_specific * t_star).sqrt();

    let mass_flow_factor =
        (gamma / r_specific).sqrt() * (2.0 / (gamma + 1.0)).powf((gamma + 1.0) / (2.0 * (gamma - 1.0)));

    let throat_area = SqMeters((m_dot * t0.sqrt()) / (p0.0 * mass_flow_factor));
    let exit_area = throat_area * input.expansion_ratio;

    let pressure_term = (pe.0 / p0.0).powf((gamma - 1.0) / gamma);

    let exit_velocity = if input.is_supersonic {
        (2.0 * (gamma / (gamma - 1.0)) * r_specific * t0 * (1.0 - pressure_term)).sqrt()
    } else {
        a_star * SUBSONIC_VELOCITY_FACTOR
    };

    let exit_sound_speed = (gamma * r_specific * t0 * pressure_term).sqrt();
    let mach_number = exit_velocity / exit_sound_speed;

    let thrust = m_dot * exit_velocity + (pe.0 - AMBIENT_PRESSURE_PA) * exit_area.0;

    let ideal_thrust = m_dot * a_star * 2.0;
    let efficiency = MAX_EFFICIENCY_PCT.min((thrust / ideal_thrust) * 100.0);

    let optimal_expansion_ratio = input.optimal_expansion_ratio();

    let throat_area_mm2: SqMillimeters = throat_area.into();
    let exit_area_mm2: SqMillimeters = exit_area.into();

    let notes = recommendations(input, mach_number, efficiency, optimal_expansion_ratio);

    Ok(LavalNozzleResult {
        throat_area_mm2: throat_area_mm2.0,
        exit_area_mm2: exit_area_mm2.0,
        exit_velocity_mps: exit_velocity,
        mach_number,
        thrust_n: thrust,
        efficiency_pct: efficiency,
        critical_pressure_ratio,
        critical_temperature_k: t_star,
        critical_velocity_mps: a_star,
        optimal_expansion_ratio,
        notes,
    })
}

fn recommendations(input: &LavalNozzleInput, mach: f64, efficiency: f64, optimal_ratio: f64) -> String {
    let mut notes = Vec::new();

    if input.is_supersonic && mach < 1.0 {
        notes.push(
            "Warning: subsonic exit although a supersonic regime was requested. Check the expansion ratio."
                .to_string(),
        );
    }

    if !input.is_supersonic && mach > NEAR_SONIC_MACH {
        notes.push("Warning: approaching sonic velocity. Consider a supersonic nozzle.".to_string());
    }

    if efficiency < LOW_EFFICIENCY_PCT {
        notes.push("Efficiency below optimal. Optimize the expansion ratio.".to_string());
    }

    notes.push(format!("Optimal expansion ratio: {:.2}", optimal_ratio));

    if (input.expansion_ratio - optimal_ratio).abs() > EXPANSION_RATIO_TOLERANCE {
        notes.push("Current expansion ratio is far from optimal.".to_string());
    }

    notes.join("\n")
}
