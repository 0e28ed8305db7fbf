//! # Apparatus Calculations
//!
//! Each apparatus follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable), with `validate()`
//! - `*Result` - Computed values plus recommendation notes
//! - `calculate(input) -> CalcResult<*Result>` - Pure calculation function
//!
//! Calculations are deterministic: no I/O, no shared state. The same input
//! always yields the same numbers and the same notes.
//!
//! ## Available Calculations
//!
//! - [`oxygen_lance`] - Oxygen jet from a top-blown lance
//! - [`laval_nozzle`] - Converging-diverging nozzle
//! - [`gases`] - Working gas property table

pub mod gases;
pub mod laval_nozzle;
pub mod oxygen_lance;

use serde::{Deserialize, Serialize};

pub use laval_nozzle::{LavalNozzleInput, LavalNozzleResult};
pub use oxygen_lance::{OxygenLanceInput, OxygenLanceResult};

use crate::codec::ParameterMap;
use crate::errors::{CalcError, CalcResult};
use crate::record::{CalculationRecord, CalculationType, OwnerId};

/// Input for any supported apparatus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApparatusInput {
    OxygenLance(OxygenLanceInput),
    LavalNozzle(LavalNozzleInput),
}

/// Output for any supported apparatus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApparatusOutput {
    OxygenLance(OxygenLanceResult),
    LavalNozzle(LavalNozzleResult),
}

impl ApparatusInput {
    /// The record type this input produces
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            ApparatusInput::OxygenLance(_) => CalculationType::OxygenLance,
            ApparatusInput::LavalNozzle(_) => CalculationType::LavalNozzle,
        }
    }

    /// Validate without computing
    pub fn validate(&self) -> CalcResult<()> {
        match self {
            ApparatusInput::OxygenLance(input) => input.validate(),
            ApparatusInput::LavalNozzle(input) => input.validate(),
        }
    }

    /// Storage form of the input
    pub fn to_parameters(&self) -> ParameterMap {
        match self {
            ApparatusInput::OxygenLance(input) => input.to_parameters(),
            ApparatusInput::LavalNozzle(input) => input.to_parameters(),
        }
    }

    /// Rebuild a typed input from a stored parameter map.
    pub fn from_parameters(calculation_type: CalculationType, params: &ParameterMap) -> CalcResult<Self> {
        match calculation_type {
            CalculationType::OxygenLance => OxygenLanceInput::from_parameters(params).map(ApparatusInput::OxygenLance),
            CalculationType::LavalNozzle => LavalNozzleInput::from_parameters(params).map(ApparatusInput::LavalNozzle),
        }
    }
}

impl ApparatusOutput {
    /// The record type this output belongs to
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            ApparatusOutput::OxygenLance(_) => CalculationType::OxygenLance,
            ApparatusOutput::LavalNozzle(_) => CalculationType::LavalNozzle,
        }
    }

    /// Recommendation notes
    pub fn notes(&self) -> &str {
        match self {
            ApparatusOutput::OxygenLance(result) => &result.notes,
            ApparatusOutput::LavalNozzle(result) => &result.notes,
        }
    }

    /// Exit Mach number
    pub fn mach_number(&self) -> f64 {
        match self {
            ApparatusOutput::OxygenLance(result) => result.mach_number,
            ApparatusOutput::LavalNozzle(result) => result.mach_number,
        }
    }

    /// Storage form of the headline results
    pub fn to_parameters(&self) -> ParameterMap {
        match self {
            ApparatusOutput::OxygenLance(result) => result.to_parameters(),
            ApparatusOutput::LavalNozzle(result) => result.to_parameters(),
        }
    }
}

/// Validate and compute any apparatus.
///
/// ```rust
/// use steelcalc_core::calculations::{compute, ApparatusInput, OxygenLanceInput};
///
/// let input = ApparatusInput::OxygenLance(OxygenLanceInput::new(1500.0, 2.5, 15.0, 25.0, ""));
/// let output = compute(&input).unwrap();
/// assert!(!output.notes().is_empty());
/// ```
pub fn compute(input: &ApparatusInput) -> CalcResult<ApparatusOutput> {
    match input {
        ApparatusInput::OxygenLance(lance) => oxygen_lance::calculate(lance).map(ApparatusOutput::OxygenLance),
        ApparatusInput::LavalNozzle(nozzle) => laval_nozzle::calculate(nozzle).map(ApparatusOutput::LavalNozzle),
    }
}

pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"))
    }
}

impl CalculationRecord {
    /// Package a computed lance into an unsaved record.
    pub fn from_oxygen_lance(
        owner_id: OwnerId,
        title: impl Into<String>,
        input: &OxygenLanceInput,
        result: &OxygenLanceResult,
    ) -> Self {
        let mut record = CalculationRecord::new(owner_id, CalculationType::OxygenLance, title);
        record.input_parameters = input.to_parameters();
        record.output_results = result.to_parameters();
        record.notes = result.notes.clone();
        record
    }

    /// Package a computed nozzle into an unsaved record.
    pub fn from_laval_nozzle(
        owner_id: OwnerId,
        title: impl Into<String>,
        input: &LavalNozzleInput,
        result: &LavalNozzleResult,
    ) -> Self {
        let mut record = CalculationRecord::new(owner_id, CalculationType::LavalNozzle, title);
        record.input_parameters = input.to_parameters();
        record.output_results = result.to_parameters();
        record.notes = result.notes.clone();
        record
    }

    /// Package any computed apparatus into an unsaved record.
    ///
    /// Fails if the output was produced for a different apparatus.
    pub fn from_apparatus(
        owner_id: OwnerId,
        title: impl Into<String>,
        input: &ApparatusInput,
        output: &ApparatusOutput,
    ) -> CalcResult<Self> {
        match (input, output) {
            (ApparatusInput::OxygenLance(i), ApparatusOutput::OxygenLance(o)) => {
                Ok(Self::from_oxygen_lance(owner_id, title, i, o))
            }
            (ApparatusInput::LavalNozzle(i), ApparatusOutput::LavalNozzle(o)) => {
                Ok(Self::from_laval_nozzle(owner_id, title, i, o))
            }
            _ => Err(CalcError::invalid_input(
                "calculation_type",
                format!("{} / {}", input.calculation_type(), output.calculation_type()),
                "Output does not belong to the same apparatus as the input",
            )),
        }
    }

    /// Rebuild the typed input stored in this record.
    pub fn apparatus_input(&self) -> CalcResult<ApparatusInput> {
        ApparatusInput::from_parameters(self.calculation_type, &self.input_parameters)
    }
}
