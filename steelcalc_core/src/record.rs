//! # Calculation Records
//!
//! The persisted, apparatus-agnostic form of a calculation: owner, type,
//! title, two parameter maps, notes, and a timestamp. Records are what the
//! repository stores, lists, exports and imports.
//!
//! ## JSON Exchange Format
//!
//! ```json
//! {
//!   "id": 12,
//!   "userId": 3,
//!   "calculationType": "OXYGEN_LANCE",
//!   "title": "Converter #2 lance",
//!   "inputParameters": { "pressure": 2.5, "nozzleDiameter": 15.0 },
//!   "outputResults": { "machNumber": 1.54 },
//!   "notes": "Optimal flow regime.",
//!   "calculationDate": "2025-03-14T09:26:53.589793Z"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::ParameterMap;
use crate::errors::CalcError;

/// Identifier assigned by the store on save
pub type RecordId = i64;

/// Identifier of the owning user
pub type OwnerId = i64;

/// The two apparatus kinds a record can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationType {
    /// Top-blown oxygen lance
    OxygenLance,
    /// Converging-diverging nozzle
    LavalNozzle,
}

impl CalculationType {
    /// Both types, in display order
    pub const ALL: [CalculationType; 2] = [CalculationType::OxygenLance, CalculationType::LavalNozzle];

    /// Stored / exchanged name
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::OxygenLance => "OXYGEN_LANCE",
            CalculationType::LavalNozzle => "LAVAL_NOZZLE",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculationType::OxygenLance => "Oxygen lance",
            CalculationType::LavalNozzle => "Laval nozzle",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OXYGEN_LANCE" => Ok(CalculationType::OxygenLance),
            "LAVAL_NOZZLE" => Ok(CalculationType::LavalNozzle),
            other => Err(CalcError::UnknownCalculationType {
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted calculation.
///
/// `id` is `None` until the record has been saved. `calculation_date` is
/// filled with the save time when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: Option<RecordId>,

    /// Owning user
    #[serde(rename = "userId", default)]
    pub owner_id: OwnerId,

    /// Apparatus kind; immutable after save
    pub calculation_type: CalculationType,

    /// User-facing title
    pub title: String,

    /// Input parameters by name
    #[serde(default)]
    pub input_parameters: ParameterMap,

    /// Computed results by name
    #[serde(default)]
    pub output_results: ParameterMap,

    /// Recommendation notes or free text
    #[serde(default)]
    pub notes: String,

    /// When the calculation was made
    #[serde(default, with = "date_format")]
    pub calculation_date: Option<DateTime<Utc>>,
}

impl CalculationRecord {
    /// Create an empty, unsaved record.
    ///
    /// ```rust
    /// use steelcalc_core::record::{CalculationRecord, CalculationType};
    ///
    /// let record = CalculationRecord::new(1, CalculationType::LavalNozzle, "Test nozzle")
    ///     .with_input("inletPressure", 10.0)
    ///     .with_output("machNumber", 2.16);
    /// assert!(record.id.is_none());
    /// assert_eq!(record.input_parameters["inletPressure"], 10.0);
    /// ```
    pub fn new(owner_id: OwnerId, calculation_type: CalculationType, title: impl Into<String>) -> Self {
        CalculationRecord {
            id: None,
            owner_id,
            calculation_type,
            title: title.into(),
            input_parameters: ParameterMap::new(),
            output_results: ParameterMap::new(),
            notes: String::new(),
            calculation_date: None,
        }
    }

    /// Add an input parameter
    pub fn with_input(mut self, name: impl Into<String>, value: f64) -> Self {
        self.input_parameters.insert(name.into(), value);
        self
    }

    /// Add an output result
    pub fn with_output(mut self, name: impl Into<String>, value: f64) -> Self {
        self.output_results.insert(name.into(), value);
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set the calculation date
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.calculation_date = Some(date);
        self
    }

    /// Look up an input parameter
    pub fn input(&self, name: &str) -> Option<f64> {
        self.input_parameters.get(name).copied()
    }

    /// Look up an output result
    pub fn output(&self, name: &str) -> Option<f64> {
        self.output_results.get(name).copied()
    }
}

/// Inclusive date window for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Create a window; bounds are swapped if given in reverse
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            DateRange { start, end }
        } else {
            DateRange { start: end, end: start }
        }
    }
}

/// Optional restrictions for owner listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub calculation_type: Option<CalculationType>,
    pub date_range: Option<DateRange>,
}

impl RecordFilter {
    /// No restriction
    pub fn all() -> Self {
        RecordFilter::default()
    }

    /// Restrict to one calculation type
    pub fn of_type(mut self, calculation_type: CalculationType) -> Self {
        self.calculation_type = Some(calculation_type);
        self
    }

    /// Restrict to an inclusive date window
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }
}

/// Aggregates over one owner's records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationStatistics {
    pub total: usize,
    pub oxygen_lance_count: usize,
    pub laval_nozzle_count: usize,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
}

impl CalculationStatistics {
    /// Count for one calculation type
    pub fn count_for(&self, calculation_type: CalculationType) -> usize {
        match calculation_type {
            CalculationType::OxygenLance => self.oxygen_lance_count,
            CalculationType::LavalNozzle => self.laval_nozzle_count,
        }
    }
}

/// Serde adapter for `calculationDate`.
///
/// Writes RFC 3339. Reads RFC 3339, or a zone-less ISO timestamp taken as UTC.
mod date_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(None),
            Some(s) => parse(&s).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid calculationDate '{}'", s))
            }),
        }
    }

    fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(d) = DateTime::parse_from_rfc3339(s) {
            return Some(d.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
