//! # Working Gas Properties
//!
//! Adiabatic index and molar mass for the working gases a Laval nozzle can
//! be run with. Lookup is by name, case-insensitive. Unknown names fall back
//! to air-like properties (γ = 1.4, M = 0.029 kg/mol).

use serde::{Deserialize, Serialize};

/// Universal gas constant, J/(mol·K)
pub const R_UNIVERSAL: f64 = 8.314462618;

/// Molar mass of O2, kg/mol
pub const MOLAR_MASS_O2: f64 = 0.032;

/// Adiabatic index of O2
pub const GAMMA_O2: f64 = 1.4;

/// Thermodynamic properties of a working gas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasProperties {
    /// Adiabatic index γ = cp/cv
    pub gamma: f64,
    /// Molar mass, kg/mol
    pub molar_mass_kg_mol: f64,
}

/// Fallback for gases not in the table
pub const DEFAULT_GAS: GasProperties = GasProperties {
    gamma: 1.4,
    molar_mass_kg_mol: 0.029,
};

const KNOWN_GASES: [(&str, GasProperties); 5] = [
    ("Oxygen", GasProperties { gamma: 1.4, molar_mass_kg_mol: 0.032 }),
    ("Nitrogen", GasProperties { gamma: 1.4, molar_mass_kg_mol: 0.028 }),
    ("Air", GasProperties { gamma: 1.4, molar_mass_kg_mol: 0.029 }),
    ("Water vapor", GasProperties { gamma: 1.33, molar_mass_kg_mol: 0.018 }),
    ("Helium", GasProperties { gamma: 1.66, molar_mass_kg_mol: 0.004 }),
];

impl GasProperties {
    /// Look up a gas by name, falling back to [`DEFAULT_GAS`].
    ///
    /// ```rust
    /// use steelcalc_core::calculations::gases::GasProperties;
    ///
    /// assert_eq!(GasProperties::for_gas("HELIUM").gamma, 1.66);
    /// assert_eq!(GasProperties::for_gas("argon").molar_mass_kg_mol, 0.029);
    /// ```
    pub fn for_gas(name: &str) -> Self {
        Self::lookup(name).unwrap_or(DEFAULT_GAS)
    }

    /// Look up a gas by name; `None` if it is not in the table
    pub fn lookup(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        KNOWN_GASES
            .iter()
            .find(|(gas, _)| gas.to_lowercase() == key)
            .map(|(_, props)| *props)
    }

    /// Tabulated name of the gas with exactly these properties.
    ///
    /// Unknown names compute with [`DEFAULT_GAS`], which is the "Air" entry,
    /// so every property set produced by [`GasProperties::for_gas`] has a name.
    pub fn name_for(props: &GasProperties) -> Option<&'static str> {
        KNOWN_GASES
            .iter()
            .find(|(_, known)| known == props)
            .map(|(name, _)| *name)
    }

    /// Specific gas constant R_s = R / M, J/(kg·K)
    pub fn specific_gas_constant(&self) -> f64 {
        R_UNIVERSAL / self.molar_mass_kg_mol
    }
}

/// Names of the gases with tabulated properties
pub fn known_gas_names() -> impl Iterator<Item = &'static str> {
    KNOWN_GASES.iter().map(|(name, _)| *name)
}
