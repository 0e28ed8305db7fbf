//! # Storage Schema
//!
//! One `calculations` table, one row per record. Parameter maps are stored
//! as JSON text; `calculation_date` is fixed-width UTC text so that string
//! order is chronological order.
//!
//! ```text
//! id                INTEGER PRIMARY KEY AUTOINCREMENT
//! owner_id          INTEGER NOT NULL
//! calculation_type  TEXT NOT NULL  -- OXYGEN_LANCE | LAVAL_NOZZLE
//! title             TEXT NOT NULL
//! input_parameters  TEXT NOT NULL  -- {"pressure": 2.5, ...}
//! output_results    TEXT NOT NULL
//! notes             TEXT
//! calculation_date  TEXT NOT NULL  -- 2025-03-14T09:26:53.589793Z, defaults to now
//! ```

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::Connection;

use crate::errors::{CalcError, CalcResult};

/// Table DDL plus the owner / type / date indexes. Safe to run repeatedly.
const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS calculations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    calculation_type TEXT NOT NULL
        CHECK (calculation_type IN ('OXYGEN_LANCE', 'LAVAL_NOZZLE')),
    title TEXT NOT NULL,
    input_parameters TEXT NOT NULL,
    output_results TEXT NOT NULL,
    notes TEXT,
    calculation_date TEXT NOT NULL
        DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now') || '000Z')
);
CREATE INDEX IF NOT EXISTS idx_calculations_owner ON calculations (owner_id);
CREATE INDEX IF NOT EXISTS idx_calculations_type ON calculations (calculation_type);
CREATE INDEX IF NOT EXISTS idx_calculations_date ON calculations (calculation_date);
";

/// Stored timestamp layout: microsecond precision, always `Z`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Create the table and indexes if they do not exist yet.
pub fn initialize(conn: &Connection) -> CalcResult<()> {
    conn.execute_batch(CREATE_SCHEMA)
        .map_err(|e| CalcError::persistence("initialize schema", e))
}

/// Drop sub-microsecond precision so a stored date reads back unchanged
pub fn truncate_timestamp(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(6)
}

/// Format a timestamp for storage
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp (the storage format or any RFC 3339 timestamp)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = 'calculations' \
                 AND name LIKE 'idx_calculations_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 3);
    }

    #[test]
    fn test_check_constraint_rejects_unknown_type() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, \
             output_results, notes, calculation_date) VALUES (1, 'BEAM', 't', '{}', '{}', '', '2025-01-01T00:00:00.000000Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format_timestamp(&whole), "2025-03-14T09:26:53.000000Z");

        let fractional = whole + chrono::Duration::nanoseconds(589_793_238);
        let truncated = truncate_timestamp(fractional);
        assert_eq!(format_timestamp(&truncated), "2025-03-14T09:26:53.589793Z");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let date = truncate_timestamp(Utc::now());
        assert_eq!(parse_timestamp(&format_timestamp(&date)), Some(date));
    }

    #[test]
    fn test_lexical_order_is_chronological() {
        let earlier = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::microseconds(1);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_parse_rejects_other_forms() {
        assert!(parse_timestamp("2025-01-02 03:04:05").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_date_defaults_to_insert_time_in_storage_layout() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let before = truncate_timestamp(Utc::now()) - chrono::Duration::seconds(1);

        conn.execute(
            "INSERT INTO calculations (owner_id, calculation_type, title, input_parameters, output_results) \
             VALUES (1, 'OXYGEN_LANCE', 't', '{}', '{}')",
            [],
        )
        .unwrap();
        let stored: String = conn
            .query_row("SELECT calculation_date FROM calculations", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored.len(), format_timestamp(&before).len());
        let parsed = parse_timestamp(&stored).unwrap();
        assert_eq!(format_timestamp(&parsed), stored);
        assert!(parsed >= before);
    }
}
