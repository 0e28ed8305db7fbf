//! # Parameter Codec
//!
//! Encodes the free-form `name -> value` parameter maps stored with every
//! calculation record as a JSON object, and decodes them back.
//!
//! Only finite values are accepted in either direction. JSON has no literal
//! for NaN or infinity, so a non-finite value is refused up front instead of
//! being written as `null`.
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::codec::{decode, encode, ParameterMap};
//!
//! let mut params = ParameterMap::new();
//! params.insert("pressure".to_string(), 2.5);
//! params.insert("temperature".to_string(), 25.0);
//!
//! let text = encode(&params).unwrap();
//! assert_eq!(decode(&text).unwrap(), params);
//! ```

use std::collections::BTreeMap;

use crate::errors::{CalcError, CalcResult};

/// Parameter name to value. Ordered so encoding is deterministic.
pub type ParameterMap = BTreeMap<String, f64>;

/// Encode a parameter map as a JSON object.
///
/// Fails with [`CalcError::NonFiniteParameter`] on the first NaN or
/// infinite value; nothing is produced in that case.
pub fn encode(params: &ParameterMap) -> CalcResult<String> {
    ensure_finite(params)?;
    serde_json::to_string(params).map_err(CalcError::serialization)
}

/// Decode a JSON object of numbers into a parameter map.
pub fn decode(text: &str) -> CalcResult<ParameterMap> {
    let params: ParameterMap = serde_json::from_str(text).map_err(CalcError::serialization)?;
    ensure_finite(&params)?;
    Ok(params)
}

/// Check that every value in the map is finite.
pub fn ensure_finite(params: &ParameterMap) -> CalcResult<()> {
    match params.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(CalcError::NonFiniteParameter {
            name: name.clone(),
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}

/// Fetch a required parameter.
pub fn require(params: &ParameterMap, name: &str) -> CalcResult<f64> {
    params
        .get(name)
        .copied()
        .ok_or_else(|| CalcError::missing_field(name))
}
