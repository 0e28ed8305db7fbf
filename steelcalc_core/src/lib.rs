//! # steelcalc_core - Oxygen Lance and Laval Nozzle Calculations
//!
//! `steelcalc_core` computes gas-jet parameters for steelmaking apparatus and
//! keeps the results in an owner-scoped store. Inputs and outputs are
//! JSON-serializable so any frontend (CLI, service, GUI) can drive it.
//!
//! ## Design Philosophy
//!
//! - **Stateless calculations**: Pure functions that take input and return results
//! - **Typed at the edges**: One input/result pair per apparatus; flat
//!   parameter maps only at the storage boundary
//! - **Rich Errors**: Structured error types, not just strings
//! - **Explicit storage**: The repository owns a connection passed in by the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use steelcalc_core::calculations::{compute, ApparatusInput, LavalNozzleInput};
//! use steelcalc_core::record::CalculationRecord;
//! use steelcalc_core::repository::CalculationRepository;
//!
//! let input = ApparatusInput::LavalNozzle(LavalNozzleInput {
//!     gas_type: "Oxygen".to_string(),
//!     inlet_pressure_atm: 10.0,
//!     outlet_pressure_atm: 1.0,
//!     temperature_k: 300.0,
//!     mass_flow_rate_kg_s: 1.0,
//!     expansion_ratio: 5.0,
//!     is_supersonic: true,
//! });
//! let output = compute(&input)?;
//! assert!(output.mach_number() > 1.0);
//!
//! let repo = CalculationRepository::open_in_memory()?;
//! let mut record = CalculationRecord::from_apparatus(1, "Main nozzle", &input, &output)?;
//! let id = repo.save(&mut record)?;
//! assert_eq!(repo.get_by_id(id)?.title, "Main nozzle");
//! # Ok::<(), steelcalc_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Apparatus calculations and input validation
//! - [`codec`] - Parameter map encoding
//! - [`record`] - Persisted record model, filters, statistics
//! - [`repository`] - Owner-scoped SQLite store
//! - [`schema`] - Table bootstrap and timestamp format
//! - [`config`] - Application settings
//! - [`file_io`] - Exchange files with atomic writes
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod codec;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod record;
pub mod repository;
pub mod schema;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{compute, ApparatusInput, ApparatusOutput};
pub use config::AppConfig;
pub use errors::{CalcError, CalcResult};
pub use record::{CalculationRecord, CalculationStatistics, CalculationType, RecordFilter};
pub use repository::{CalculationRepository, ImportReport};
