//! # Calculation Repository
//!
//! Owner-scoped persistence for [`CalculationRecord`]s on an embedded SQLite
//! store. The repository owns its [`Connection`]; callers that need
//! concurrent access open one repository per thread.
//!
//! Every mutating operation is scoped by owner: an id belonging to somebody
//! else behaves exactly like an id that does not exist.
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::record::{CalculationRecord, CalculationType, RecordFilter};
//! use steelcalc_core::repository::CalculationRepository;
//!
//! let repo = CalculationRepository::open_in_memory()?;
//! let mut record = CalculationRecord::new(1, CalculationType::LavalNozzle, "Nozzle A")
//!     .with_input("inletPressure", 10.0);
//! let id = repo.save(&mut record)?;
//!
//! assert_eq!(repo.get_by_id(id)?.title, "Nozzle A");
//! assert_eq!(repo.get_by_owner(1, &RecordFilter::all())?.len(), 1);
//! assert!(!repo.delete(id, 2)?);
//! # Ok::<(), steelcalc_core::errors::CalcError>(())
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, Params, Row};
use serde::Serialize;

use crate::codec;
use crate::config::AppConfig;
use crate::errors::{CalcError, CalcResult};
use crate::record::{CalculationRecord, CalculationStatistics, CalculationType, OwnerId, RecordFilter, RecordId};
use crate::schema::{self, format_timestamp, parse_timestamp, truncate_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, owner_id, calculation_type, title, input_parameters, \
     output_results, notes, calculation_date FROM calculations";

/// Why one element of an import batch was not saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    /// Position in the imported array
    pub index: usize,
    pub error: CalcError,
}

/// Outcome of an import: saved ids plus per-element failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: Vec<RecordId>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of records saved
    pub fn count(&self) -> usize {
        self.imported.len()
    }

    /// Whether every element was saved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A row as stored, before the parameter text is decoded
struct StoredRow {
    id: RecordId,
    owner_id: OwnerId,
    calculation_type: String,
    title: String,
    input_parameters: String,
    output_results: String,
    notes: Option<String>,
    calculation_date: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(StoredRow {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            calculation_type: row.get(2)?,
            title: row.get(3)?,
            input_parameters: row.get(4)?,
            output_results: row.get(5)?,
            notes: row.get(6)?,
            calculation_date: row.get(7)?,
        })
    }

    fn into_record(self) -> CalcResult<CalculationRecord> {
        let id = self.id;
        let calculation_type: CalculationType = self
            .calculation_type
            .parse()
            .map_err(|e: CalcError| CalcError::decode(id, e.to_string()))?;
        let input_parameters = codec::decode(&self.input_parameters)
            .map_err(|e| CalcError::decode(id, format!("input_parameters: {}", e)))?;
        let output_results = codec::decode(&self.output_results)
            .map_err(|e| CalcError::decode(id, format!("output_results: {}", e)))?;
        let calculation_date = parse_timestamp(&self.calculation_date).ok_or_else(|| {
            CalcError::decode(id, format!("calculation_date '{}' is not a timestamp", self.calculation_date))
        })?;

        Ok(CalculationRecord {
            id: Some(id),
            owner_id: self.owner_id,
            calculation_type,
            title: self.title,
            input_parameters,
            output_results,
            notes: self.notes.unwrap_or_default(),
            calculation_date: Some(calculation_date),
        })
    }
}

/// Smallest stored timestamp that is not earlier than `date`
fn lower_bound(date: &DateTime<Utc>) -> String {
    let truncated = truncate_timestamp(*date);
    if truncated < *date {
        format_timestamp(&(truncated + Duration::microseconds(1)))
    } else {
        format_timestamp(&truncated)
    }
}

/// SQLite-backed record store.
pub struct CalculationRepository {
    conn: Connection,
}

impl CalculationRepository {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection) -> CalcResult<Self> {
        schema::initialize(&conn)?;
        Ok(CalculationRepository { conn })
    }

    /// Open (or create) a database file
    pub fn open(path: &Path) -> CalcResult<Self> {
        let conn = Connection::open(path).map_err(|e| CalcError::persistence("open database", e))?;
        Self::new(conn)
    }

    /// Private in-memory store, discarded on drop
    pub fn open_in_memory() -> CalcResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CalcError::persistence("open database", e))?;
        Self::new(conn)
    }

    /// Open the database named by the configuration.
    pub fn from_config(config: &AppConfig) -> CalcResult<Self> {
        let conn = Connection::open(&config.database_path)
            .map_err(|e| CalcError::persistence("open database", e))?;
        conn.busy_timeout(config.busy_timeout())
            .map_err(|e| CalcError::persistence("set busy timeout", e))?;
        log::debug!("opened calculation store at {}", config.database_path.display());
        Self::new(conn)
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a new record.
    ///
    /// Any `id` on the record is ignored; the store assigns one. A missing
    /// `calculation_date` becomes now. On success the record is updated
    /// with the assigned id and the stored date; on failure it is untouched.
    pub fn save(&self, record: &mut CalculationRecord) -> CalcResult<RecordId> {
        let input = codec::encode(&record.input_parameters)?;
        let output = codec::encode(&record.output_results)?;
        let date = truncate_timestamp(record.calculation_date.unwrap_or_else(Utc::now));

        self.conn
            .execute(
                "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, \
                 output_results, notes, calculation_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.owner_id,
                    record.calculation_type.as_str(),
                    record.title,
                    input,
                    output,
                    record.notes,
                    format_timestamp(&date),
                ],
            )
            .map_err(|e| CalcError::persistence("save calculation", e))?;

        let id = self.conn.last_insert_rowid();
        record.id = Some(id);
        record.calculation_date = Some(date);
        log::debug!("saved calculation {} ({}) for owner {}", id, record.calculation_type, record.owner_id);
        Ok(id)
    }

    /// An owner's records, newest first.
    ///
    /// Rows whose stored parameters cannot be decoded are skipped with a
    /// warning; use [`get_by_id`](Self::get_by_id) to see the error.
    pub fn get_by_owner(&self, owner_id: OwnerId, filter: &RecordFilter) -> CalcResult<Vec<CalculationRecord>> {
        let sql = format!(
            "{} WHERE owner_id = :owner \
             AND (:type IS NULL OR calculation_type = :type) \
             AND (:start IS NULL OR calculation_date >= :start) \
             AND (:end IS NULL OR calculation_date <= :end) \
             ORDER BY calculation_date DESC, id DESC",
            SELECT_COLUMNS
        );
        let type_name = filter.calculation_type.map(|t| t.as_str());
        let start = filter.date_range.map(|r| lower_bound(&r.start));
        let end = filter.date_range.map(|r| format_timestamp(&r.end));

        self.query_records(
            &sql,
            named_params! {
                ":owner": owner_id,
                ":type": type_name,
                ":start": start,
                ":end": end,
            },
        )
    }

    /// Fetch one record regardless of owner.
    pub fn get_by_id(&self, id: RecordId) -> CalcResult<CalculationRecord> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id], StoredRow::from_row)
            .optional()
            .map_err(|e| CalcError::persistence("get calculation", e))?;

        match row {
            Some(row) => row.into_record(),
            None => Err(CalcError::NotFound { id }),
        }
    }

    /// Case-insensitive title substring search, newest first.
    pub fn search_by_title(&self, owner_id: OwnerId, term: &str) -> CalcResult<Vec<CalculationRecord>> {
        let needle = term.to_lowercase();
        let records = self.get_by_owner(owner_id, &RecordFilter::all())?;
        Ok(records
            .into_iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .collect())
    }

    /// Replace title, notes and both parameter maps.
    ///
    /// The row is matched on `(id, owner_id)`; type and owner never change.
    /// Returns `false` when no such row exists for this owner.
    pub fn update(&self, record: &CalculationRecord) -> CalcResult<bool> {
        let id = record.id.ok_or_else(|| CalcError::missing_field("id"))?;
        let input = codec::encode(&record.input_parameters)?;
        let output = codec::encode(&record.output_results)?;

        let changed = self
            .conn
            .execute(
                "UPDATE calculations SET title = ?1, notes = ?2, input_parameters = ?3, output_results = ?4 \
                 WHERE id = ?5 AND owner_id = ?6",
                params![record.title, record.notes, input, output, id, record.owner_id],
            )
            .map_err(|e| CalcError::persistence("update calculation", e))?;

        log::debug!("update calculation {} for owner {}: {} row(s)", id, record.owner_id, changed);
        Ok(changed > 0)
    }

    /// Remove a record owned by `owner_id`. Returns whether a row was removed.
    pub fn delete(&self, id: RecordId, owner_id: OwnerId) -> CalcResult<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM calculations WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )
            .map_err(|e| CalcError::persistence("delete calculation", e))?;

        log::debug!("delete calculation {} for owner {}: {} row(s)", id, owner_id, changed);
        Ok(changed > 0)
    }

    /// Delete several records; each id is handled on its own.
    pub fn delete_many(&self, ids: &[RecordId], owner_id: OwnerId) -> CalcResult<usize> {
        let mut removed = 0;
        for &id in ids {
            if self.delete(id, owner_id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Counts and date span of an owner's records.
    pub fn statistics(&self, owner_id: OwnerId) -> CalcResult<CalculationStatistics> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT calculation_type, COUNT(*), MIN(calculation_date), MAX(calculation_date) \
                 FROM calculations WHERE owner_id = ?1 GROUP BY calculation_type",
            )
            .map_err(|e| CalcError::persistence("statistics", e))?;

        let groups = stmt
            .query_map(params![owner_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| CalcError::persistence("statistics", e))?;

        let mut stats = CalculationStatistics::default();
        for (type_name, count, first, last) in groups {
            let count = usize::try_from(count).unwrap_or(0);
            match type_name.parse::<CalculationType>() {
                Ok(CalculationType::OxygenLance) => stats.oxygen_lance_count += count,
                Ok(CalculationType::LavalNozzle) => stats.laval_nozzle_count += count,
                Err(e) => {
                    log::warn!("statistics for owner {}: {}", owner_id, e);
                    continue;
                }
            }
            stats.total += count;

            let first = first.as_deref().and_then(parse_timestamp);
            let last = last.as_deref().and_then(parse_timestamp);
            stats.first_date = match (stats.first_date, first) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            stats.last_date = match (stats.last_date, last) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }
        Ok(stats)
    }

    /// All of an owner's records as a pretty-printed JSON array.
    pub fn export_json(&self, owner_id: OwnerId) -> CalcResult<String> {
        let records = self.get_by_owner(owner_id, &RecordFilter::all())?;
        serde_json::to_string_pretty(&records).map_err(CalcError::serialization)
    }

    /// Import records into `owner_id`'s collection. Returns how many were saved.
    pub fn import_json(&self, owner_id: OwnerId, text: &str) -> CalcResult<usize> {
        self.import_json_report(owner_id, text).map(|report| report.count())
    }

    /// Import records, reporting each element that could not be saved.
    ///
    /// Not atomic: every element is saved on its own and a bad element does
    /// not stop the rest. Supplied ids are discarded and the owner is
    /// replaced with `owner_id`. Fails only when `text` is not a JSON array.
    pub fn import_json_report(&self, owner_id: OwnerId, text: &str) -> CalcResult<ImportReport> {
        let items: Vec<serde_json::Value> = serde_json::from_str(text).map_err(|e| CalcError::SerializationError {
            reason: format!("Import is not a JSON array: {}", e),
        })?;

        let mut report = ImportReport::default();
        for (index, item) in items.into_iter().enumerate() {
            let saved = serde_json::from_value::<CalculationRecord>(item)
                .map_err(CalcError::serialization)
                .and_then(|mut record| {
                    record.id = None;
                    record.owner_id = owner_id;
                    self.save(&mut record)
                });

            match saved {
                Ok(id) => report.imported.push(id),
                Err(error) => {
                    log::warn!("skipping import element {}: {}", index, error);
                    report.failures.push(ImportFailure { index, error });
                }
            }
        }

        log::debug!(
            "imported {} of {} record(s) for owner {}",
            report.imported.len(),
            report.imported.len() + report.failures.len(),
            owner_id
        );
        Ok(report)
    }

    fn query_records<P: Params>(&self, sql: &str, params: P) -> CalcResult<Vec<CalculationRecord>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| CalcError::persistence("list calculations", e))?;
        let rows = stmt
            .query_map(params, StoredRow::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| CalcError::persistence("list calculations", e))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping unreadable row: {}", e);
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn repo() -> CalculationRepository {
        CalculationRepository::open_in_memory().unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn lance(owner: OwnerId, title: &str) -> CalculationRecord {
        CalculationRecord::new(owner, CalculationType::OxygenLance, title)
            .with_input("oxygenFlowRate", 1500.0)
            .with_input("pressure", 2.5)
            .with_output("machNumber", 1.5447395542119906)
            .with_notes("Optimal flow regime.")
    }

    fn nozzle(owner: OwnerId, title: &str) -> CalculationRecord {
        CalculationRecord::new(owner, CalculationType::LavalNozzle, title)
            .with_input("inletPressure", 10.0)
            .with_input("isSupersonic", 1.0)
            .with_output("machNumber", 2.1571946236759096)
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let repo = repo();
        let mut record = lance(1, "Converter #2");
        let original = record.clone();

        let id = repo.save(&mut record).unwrap();
        assert_eq!(record.id, Some(id));
        assert!(record.calculation_date.is_some());

        let loaded = repo.get_by_id(id).unwrap();
        assert_eq!(loaded.title, original.title);
        assert_eq!(loaded.calculation_type, original.calculation_type);
        assert_eq!(loaded.notes, original.notes);
        assert_eq!(loaded.input_parameters, original.input_parameters);
        assert_eq!(loaded.output_results, original.output_results);
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_stored_nozzle_recomputes_with_its_gas() {
        use crate::calculations::{compute, ApparatusInput, LavalNozzleInput};

        let repo = repo();
        let input = ApparatusInput::LavalNozzle(LavalNozzleInput {
            gas_type: "Helium".to_string(),
            inlet_pressure_atm: 10.0,
            outlet_pressure_atm: 1.0,
            temperature_k: 300.0,
            mass_flow_rate_kg_s: 1.0,
            expansion_ratio: 5.0,
            is_supersonic: true,
        });
        let output = compute(&input).unwrap();
        let mut record = CalculationRecord::from_apparatus(1, "Helium nozzle", &input, &output).unwrap();
        let id = repo.save(&mut record).unwrap();

        let loaded = repo.get_by_id(id).unwrap();
        let rebuilt = loaded.apparatus_input().unwrap();
        assert_eq!(rebuilt, input);

        let fresh = compute(&rebuilt).unwrap();
        assert_eq!(fresh.to_parameters(), loaded.output_results);
        assert_eq!(fresh.notes(), loaded.notes);
    }

    #[test]
    fn test_save_assigns_fresh_ids() {
        let repo = repo();
        let mut a = lance(1, "A");
        a.id = Some(999);
        let first = repo.save(&mut a).unwrap();
        let second = repo.save(&mut lance(1, "B")).unwrap();
        assert_ne!(first, 999);
        assert_ne!(first, second);
    }

    #[test]
    fn test_save_keeps_supplied_date() {
        let repo = repo();
        let date = at(14, 9) + Duration::nanoseconds(589_793_238);
        let id = repo.save(&mut lance(1, "Dated").with_date(date)).unwrap();

        let loaded = repo.get_by_id(id).unwrap();
        assert_eq!(loaded.calculation_date, Some(truncate_timestamp(date)));
    }

    #[test]
    fn test_save_rejects_non_finite() {
        let repo = repo();
        let mut record = lance(1, "Broken").with_output("thrust", f64::NAN);

        let err = repo.save(&mut record).unwrap_err();
        assert!(matches!(err, CalcError::NonFiniteParameter { ref name, .. } if name == "thrust"));
        assert!(record.id.is_none());
        assert!(repo.get_by_owner(1, &RecordFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_get_by_id_not_found() {
        assert_eq!(repo().get_by_id(42).unwrap_err(), CalcError::NotFound { id: 42 });
    }

    #[test]
    fn test_get_by_owner_scoping_and_order() {
        let repo = repo();
        repo.save(&mut lance(1, "Old").with_date(at(1, 8))).unwrap();
        repo.save(&mut nozzle(1, "Newest").with_date(at(20, 8))).unwrap();
        repo.save(&mut lance(1, "Middle").with_date(at(10, 8))).unwrap();
        repo.save(&mut lance(2, "Other owner").with_date(at(15, 8))).unwrap();

        let titles: Vec<_> = repo
            .get_by_owner(1, &RecordFilter::all())
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Old"]);
    }

    #[test]
    fn test_get_by_owner_type_filter() {
        let repo = repo();
        repo.save(&mut nozzle(1, "N1").with_date(at(2, 0))).unwrap();
        repo.save(&mut lance(1, "L1").with_date(at(3, 0))).unwrap();
        repo.save(&mut nozzle(1, "N2").with_date(at(4, 0))).unwrap();
        repo.save(&mut nozzle(2, "N3").with_date(at(5, 0))).unwrap();

        let records = repo
            .get_by_owner(1, &RecordFilter::all().of_type(CalculationType::LavalNozzle))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.calculation_type == CalculationType::LavalNozzle));
        assert!(records
            .windows(2)
            .all(|w| w[0].calculation_date >= w[1].calculation_date));
        assert_eq!(records[0].title, "N2");
    }

    #[test]
    fn test_get_by_owner_date_range_is_inclusive() {
        let repo = repo();
        for day in [1, 5, 10, 15] {
            repo.save(&mut lance(1, &format!("Day {}", day)).with_date(at(day, 12))).unwrap();
        }

        let records = repo
            .get_by_owner(1, &RecordFilter::all().between(at(5, 12), at(10, 12)))
            .unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Day 10", "Day 5"]);

        let reversed = repo
            .get_by_owner(1, &RecordFilter::all().between(at(10, 12), at(5, 12)))
            .unwrap();
        assert_eq!(reversed.len(), 2);
    }

    #[test]
    fn test_date_range_sub_microsecond_start() {
        let repo = repo();
        repo.save(&mut lance(1, "Edge").with_date(at(5, 12))).unwrap();

        let start = at(5, 12) + Duration::nanoseconds(500);
        let records = repo
            .get_by_owner(1, &RecordFilter::all().between(start, at(6, 0)))
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_search_by_title_case_insensitive() {
        let repo = repo();
        repo.save(&mut lance(1, "Converter LANCE").with_date(at(1, 0))).unwrap();
        repo.save(&mut lance(1, "Ladle lance").with_date(at(2, 0))).unwrap();
        repo.save(&mut nozzle(1, "Nozzle").with_date(at(3, 0))).unwrap();
        repo.save(&mut lance(2, "Someone else's lance")).unwrap();

        let titles: Vec<_> = repo
            .search_by_title(1, "lAnCe")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Ladle lance", "Converter LANCE"]);

        assert_eq!(repo.search_by_title(1, "").unwrap().len(), 3);
        assert!(repo.search_by_title(1, "tuyere").unwrap().is_empty());
    }

    #[test]
    fn test_search_non_ascii_title() {
        let repo = repo();
        repo.save(&mut lance(1, "ФУРМА конвертера")).unwrap();
        assert_eq!(repo.search_by_title(1, "фурма").unwrap().len(), 1);
    }

    #[test]
    fn test_update_replaces_mutable_fields_only() {
        let repo = repo();
        let mut record = lance(1, "Before");
        let id = repo.save(&mut record).unwrap();

        let mut changed = record.clone();
        changed.title = "After".to_string();
        changed.notes = "Edited".to_string();
        changed.calculation_type = CalculationType::LavalNozzle;
        changed.input_parameters.insert("pressure".to_string(), 3.0);
        changed.output_results.clear();
        assert!(repo.update(&changed).unwrap());

        let loaded = repo.get_by_id(id).unwrap();
        assert_eq!(loaded.title, "After");
        assert_eq!(loaded.notes, "Edited");
        assert_eq!(loaded.input("pressure"), Some(3.0));
        assert!(loaded.output_results.is_empty());
        assert_eq!(loaded.calculation_type, CalculationType::OxygenLance);
        assert_eq!(loaded.owner_id, 1);
        assert_eq!(loaded.calculation_date, record.calculation_date);
    }

    #[test]
    fn test_update_other_owner_is_noop() {
        let repo = repo();
        let mut record = lance(1, "Mine");
        let id = repo.save(&mut record).unwrap();

        let mut hijack = record.clone();
        hijack.owner_id = 2;
        hijack.title = "Stolen".to_string();
        assert!(!repo.update(&hijack).unwrap());

        let loaded = repo.get_by_id(id).unwrap();
        assert_eq!(loaded.title, "Mine");
        assert_eq!(loaded.owner_id, 1);
    }

    #[test]
    fn test_update_failures_leave_row_untouched() {
        let repo = repo();
        let mut record = lance(1, "Stable");
        let id = repo.save(&mut record).unwrap();

        assert_eq!(
            repo.update(&lance(1, "No id")).unwrap_err(),
            CalcError::missing_field("id")
        );

        let mut bad = record.clone();
        bad.title = "Changed".to_string();
        bad.input_parameters.insert("pressure".to_string(), f64::INFINITY);
        assert!(repo.update(&bad).is_err());
        assert_eq!(repo.get_by_id(id).unwrap().title, "Stable");

        let mut missing = record.clone();
        missing.id = Some(id + 100);
        assert!(!repo.update(&missing).unwrap());
    }

    #[test]
    fn test_delete_respects_owner() {
        let repo = repo();
        let id = repo.save(&mut lance(2, "Owner B")).unwrap();

        assert!(!repo.delete(id, 1).unwrap());
        assert_eq!(repo.get_by_id(id).unwrap().owner_id, 2);

        assert!(repo.delete(id, 2).unwrap());
        assert_eq!(repo.get_by_id(id).unwrap_err(), CalcError::NotFound { id });
        assert!(!repo.delete(id, 2).unwrap());
    }

    #[test]
    fn test_delete_many() {
        let repo = repo();
        let a = repo.save(&mut lance(1, "A")).unwrap();
        let b = repo.save(&mut lance(1, "B")).unwrap();
        let c = repo.save(&mut lance(2, "C")).unwrap();

        assert_eq!(repo.delete_many(&[a, b, c, 12345], 1).unwrap(), 2);
        assert!(repo.get_by_owner(1, &RecordFilter::all()).unwrap().is_empty());
        assert!(repo.get_by_id(c).is_ok());
    }

    #[test]
    fn test_statistics() {
        let repo = repo();
        repo.save(&mut lance(1, "L1").with_date(at(3, 0))).unwrap();
        repo.save(&mut lance(1, "L2").with_date(at(9, 0))).unwrap();
        repo.save(&mut nozzle(1, "N1").with_date(at(1, 0))).unwrap();
        repo.save(&mut nozzle(2, "N2").with_date(at(30, 0))).unwrap();

        let stats = repo.statistics(1).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count_for(CalculationType::OxygenLance), 2);
        assert_eq!(stats.count_for(CalculationType::LavalNozzle), 1);
        assert_eq!(stats.first_date, Some(at(1, 0)));
        assert_eq!(stats.last_date, Some(at(9, 0)));
    }

    #[test]
    fn test_statistics_empty_owner() {
        assert_eq!(repo().statistics(7).unwrap(), CalculationStatistics::default());
    }

    #[test]
    fn test_export_nests_parameter_objects() {
        let repo = repo();
        repo.save(&mut lance(1, "Exported").with_date(at(2, 0))).unwrap();
        repo.save(&mut lance(2, "Not exported")).unwrap();

        let json: serde_json::Value = serde_json::from_str(&repo.export_json(1).unwrap()).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["userId"], 1);
        assert_eq!(items[0]["calculationType"], "OXYGEN_LANCE");
        assert!(items[0]["inputParameters"].is_object());
        assert_eq!(items[0]["inputParameters"]["pressure"], 2.5);
        assert!(items[0]["outputResults"].is_object());
    }

    #[test]
    fn test_import_skips_malformed_element() {
        let repo = repo();
        let text = r#"[
            {"calculationType": "OXYGEN_LANCE", "title": "Good lance",
             "inputParameters": {"pressure": 2.5}, "outputResults": {"machNumber": 1.54},
             "notes": "ok", "calculationDate": "2025-03-01T10:00:00Z"},
            {"calculationType": "BEAM", "title": "Bad"},
            {"id": 77, "userId": 99, "calculationType": "LAVAL_NOZZLE", "title": "Good nozzle",
             "inputParameters": {"inletPressure": 10}, "outputResults": {}}
        ]"#;

        let report = repo.import_json_report(5, text).unwrap();
        assert_eq!(report.count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);

        for id in &report.imported {
            let record = repo.get_by_id(*id).unwrap();
            assert_eq!(record.owner_id, 5);
            assert_ne!(record.id, Some(77));
        }
        assert!(repo.get_by_owner(99, &RecordFilter::all()).unwrap().is_empty());

        let lance = repo.search_by_title(5, "good lance").unwrap();
        assert_eq!(lance[0].calculation_date, Some(at(1, 10)));
    }

    #[test]
    fn test_import_json_returns_count() {
        let repo = repo();
        let text = r#"[{"title": "missing type"},
            {"calculationType": "LAVAL_NOZZLE", "title": "A"},
            {"calculationType": "LAVAL_NOZZLE", "title": "B"}]"#;
        assert_eq!(repo.import_json(3, text).unwrap(), 2);
        assert_eq!(repo.get_by_owner(3, &RecordFilter::all()).unwrap().len(), 2);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let repo = repo();
        assert!(matches!(
            repo.import_json(1, r#"{"title": "x"}"#),
            Err(CalcError::SerializationError { .. })
        ));
        assert!(repo.import_json(1, "not json").is_err());
        assert_eq!(repo.import_json(1, "[]").unwrap(), 0);
    }

    #[test]
    fn test_export_import_roundtrip_between_owners() {
        let repo = repo();
        repo.save(&mut lance(1, "L").with_date(at(1, 0))).unwrap();
        repo.save(&mut nozzle(1, "N").with_date(at(2, 0))).unwrap();

        let exported = repo.export_json(1).unwrap();
        assert_eq!(repo.import_json(2, &exported).unwrap(), 2);

        let strip = |records: Vec<CalculationRecord>| {
            records
                .into_iter()
                .map(|r| (r.title, r.input_parameters, r.output_results, r.calculation_date))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            strip(repo.get_by_owner(1, &RecordFilter::all()).unwrap()),
            strip(repo.get_by_owner(2, &RecordFilter::all()).unwrap())
        );
    }

    #[test]
    fn test_corrupt_row_is_a_decode_error() {
        let repo = repo();
        repo.save(&mut lance(1, "Fine").with_date(at(1, 0))).unwrap();
        repo.connection()
            .execute(
                "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, \
                 output_results, notes, calculation_date) \
                 VALUES (1, 'OXYGEN_LANCE', 'Corrupt', 'not json', '{}', NULL, '2025-03-02T00:00:00.000000Z')",
                [],
            )
            .unwrap();
        let corrupt_id = repo.connection().last_insert_rowid();

        match repo.get_by_id(corrupt_id) {
            Err(CalcError::Decode { record_id, .. }) => assert_eq!(record_id, corrupt_id),
            other => panic!("expected Decode error, got {other:?}"),
        }

        let records = repo.get_by_owner(1, &RecordFilter::all()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Fine");
    }

    #[test]
    fn test_null_notes_read_as_empty() {
        let repo = repo();
        repo.connection()
            .execute(
                "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, \
                 output_results, notes, calculation_date) \
                 VALUES (1, 'LAVAL_NOZZLE', 'Legacy', '{}', '{}', NULL, '2025-03-02T08:30:00.000000Z')",
                [],
            )
            .unwrap();
        let id = repo.connection().last_insert_rowid();

        let record = repo.get_by_id(id).unwrap();
        assert_eq!(record.notes, "");
        assert_eq!(
            record.calculation_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 2, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_row_without_date_lists_in_range() {
        let repo = repo();
        let start = Utc::now() - chrono::Duration::seconds(5);
        repo.connection()
            .execute(
                "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, output_results) \
                 VALUES (1, 'OXYGEN_LANCE', 'Undated', '{}', '{}')",
                [],
            )
            .unwrap();
        let end = Utc::now() + chrono::Duration::seconds(5);

        let records = repo
            .get_by_owner(1, &RecordFilter::all().between(start, end))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Undated");
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calc.db");

        let id = {
            let repo = CalculationRepository::open(&path).unwrap();
            repo.save(&mut nozzle(4, "Persisted")).unwrap()
        };

        let repo = CalculationRepository::open(&path).unwrap();
        assert_eq!(repo.get_by_id(id).unwrap().title, "Persisted");
    }

    #[test]
    fn test_from_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            database_path: dir.path().join("configured.db"),
            busy_timeout_ms: 100,
            default_owner_id: Some(1),
        };

        let repo = CalculationRepository::from_config(&config).unwrap();
        repo.save(&mut lance(1, "Configured")).unwrap();
        assert!(config.database_path.exists());
    }
}
