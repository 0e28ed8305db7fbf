//! # File I/O Module
//!
//! Reads and writes JSON exchange files produced by
//! [`CalculationRepository::export_json`](crate::repository::CalculationRepository::export_json)
//! and consumed by `import_json`.
//!
//! Exports are written atomically: write to `.tmp`, sync, rename. An
//! interrupted export never leaves a truncated file at the target path.
//!
//! ## Example
//!
//! ```rust,no_run
//! use steelcalc_core::file_io::{read_import, write_export};
//! use std::path::Path;
//!
//! write_export(Path::new("calculations.json"), "[]")?;
//! let text = read_import(Path::new("calculations.json"))?;
//! assert_eq!(text, "[]");
//! # Ok::<(), steelcalc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{CalcError, CalcResult};

/// Temp path used while an export is being written
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write exported JSON to `path` atomically.
///
/// 1. Write to a temporary file next to the target
/// 2. Sync to disk (fsync)
/// 3. Rename over the target
pub fn write_export(path: &Path, json: &str) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    log::debug!("wrote export to {}", path.display());
    Ok(())
}

/// Read an exchange file for import.
///
/// Only the text is returned; parsing happens in the repository so that
/// malformed elements can be skipped individually.
pub fn read_import(path: &Path) -> CalcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    Ok(contents)
}
