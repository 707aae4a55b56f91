//! File import and export for the ledger.
//!
//! Two import shapes are accepted (a bare JSON array or our own export
//! wrapper, plus CSV with an optional header). Both are normalized to one
//! canonical record shape before validation, so the validation path does
//! not branch per source format. Row-level failures skip the row and are
//! counted; an unrecognized top-level shape aborts before any row is
//! written. Already-imported rows are never rolled back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::LedgerEntry;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unrecognised format: {0}")]
    FormatError(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
}

/// Outcome of an import run. Skipped rows failed validation; imported
/// rows were upserted, overwriting any existing entry for the same date.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Canonical record shape both import formats normalize into.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NormalizedRecord {
    date: String,
    count: i64,
    notes: String,
}

/// Import a JSON document: either a bare array of `{date, jaap|count,
/// notes?}` objects or the export wrapper `{entries: [...]}`.
pub fn import_json(text: &str, db: &Database) -> Result<ImportReport, ImportError> {
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| ImportError::FormatError(format!("invalid JSON: {e}")))?;

    let records = match &parsed {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("entries") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Err(ImportError::FormatError("unrecognised JSON shape".to_string())),
        },
        _ => return Err(ImportError::FormatError("unrecognised JSON shape".to_string())),
    };

    let mut report = ImportReport::default();
    for record in records {
        match normalize_json_record(record) {
            Some(rec) => {
                db.save_entry(&rec.date, rec.count, &rec.notes)?;
                report.imported += 1;
            }
            None => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Import CSV lines of `date,count,notes`. A first line containing the
/// token "date" (case-insensitive) is treated as a header and skipped.
pub fn import_csv(text: &str, db: &Database) -> Result<ImportReport, ImportError> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = match lines.first() {
        Some(first) if first.to_lowercase().contains("date") => 1,
        _ => 0,
    };

    let mut report = ImportReport::default();
    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match normalize_csv_line(line) {
            Some(rec) => {
                db.save_entry(&rec.date, rec.count, &rec.notes)?;
                report.imported += 1;
            }
            None => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Normalize one JSON object. `jaap` is an accepted alias for `count`
/// and takes precedence. Returns `None` for rows that fail validation:
/// missing or malformed date, or a present but non-numeric count.
fn normalize_json_record(value: &Value) -> Option<NormalizedRecord> {
    let date = value.get("date")?.as_str()?;
    if !DATE_RE.is_match(date) {
        return None;
    }

    let count = match value.get("jaap").or_else(|| value.get("count")) {
        None | Some(Value::Null) => 0,
        Some(raw) => numeric_count(raw)?,
    };

    let notes = value
        .get("notes")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Some(NormalizedRecord {
        date: date.to_string(),
        count,
        notes,
    })
}

fn numeric_count(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Normalize one CSV data line. The notes field may be double-quote
/// wrapped with internal quotes doubled; anything after the second comma
/// belongs to the notes.
fn normalize_csv_line(line: &str) -> Option<NormalizedRecord> {
    let mut parts = line.splitn(3, ',');
    let date = parts.next()?.trim();
    let count_field = parts.next()?.trim();
    let notes_field = parts.next().unwrap_or("");

    if !DATE_RE.is_match(date) {
        return None;
    }

    let count = if count_field.is_empty() {
        0
    } else {
        count_field.parse::<i64>().ok()?
    };

    Some(NormalizedRecord {
        date: date.to_string(),
        count,
        notes: unquote_notes(notes_field),
    })
}

fn unquote_notes(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    inner.replace("\"\"", "\"")
}

/// Export all entries as CSV with a header row; notes are always quoted,
/// internal quotes doubled.
pub fn export_csv(entries: &[LedgerEntry]) -> String {
    let mut out = String::from("Date,Jaap Count,Notes\n");
    for entry in entries {
        out.push_str(&format!(
            "{},{},\"{}\"\n",
            entry.date,
            entry.count,
            entry.notes.replace('"', "\"\"")
        ));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile<'a> {
    export_date: &'a str,
    total_entries: usize,
    entries: &'a [LedgerEntry],
}

/// Export all entries as a JSON document. `exported_at` is the
/// capture-time timestamp, supplied by the caller.
pub fn export_json(entries: &[LedgerEntry], exported_at: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportFile {
        export_date: exported_at,
        total_entries: entries.len(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir) -> Database {
        let path = dir.path().join("ledger.db");
        Database::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn json_bare_array_imports() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_json(
            r#"[{"date":"2026-01-01","count":108,"notes":"morning"},
                {"date":"2026-01-02","count":216}]"#,
            &db,
        )
        .unwrap();

        assert_eq!(report, ImportReport { imported: 2, skipped: 0 });
        let entry = db.get_entry("2026-01-01").unwrap().unwrap();
        assert_eq!(entry.count, 108);
        assert_eq!(entry.notes, "morning");
    }

    #[test]
    fn json_wrapper_shape_imports() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_json(
            r#"{"exportDate":"2026-02-01T00:00:00Z","totalEntries":1,
                "entries":[{"date":"2026-01-01","count":108}]}"#,
            &db,
        )
        .unwrap();

        assert_eq!(report.imported, 1);
    }

    #[test]
    fn jaap_alias_is_equivalent_to_count() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        import_json(r#"[{"date":"2026-01-01","jaap":108}]"#, &db).unwrap();
        import_json(r#"[{"date":"2026-01-02","count":108}]"#, &db).unwrap();

        let a = db.get_entry("2026-01-01").unwrap().unwrap();
        let b = db.get_entry("2026-01-02").unwrap().unwrap();
        assert_eq!(a.count, b.count);
    }

    #[test]
    fn unrecognised_json_shape_aborts_before_any_row() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        assert!(matches!(
            import_json(r#"{"rows":[{"date":"2026-01-01","count":1}]}"#, &db),
            Err(ImportError::FormatError(_))
        ));
        assert!(matches!(
            import_json("not json at all", &db),
            Err(ImportError::FormatError(_))
        ));
        assert!(db.get_all_entries().unwrap().is_empty());
    }

    #[test]
    fn invalid_rows_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_json(
            r#"[{"date":"2026-01-01","count":108},
                {"date":"01/02/2026","count":5},
                {"count":7},
                {"date":"2026-01-04","count":"not a number"},
                {"date":"2026-01-05"}]"#,
            &db,
        )
        .unwrap();

        // malformed date, missing date, and non-numeric count skip;
        // a missing count defaults to zero
        assert_eq!(report, ImportReport { imported: 2, skipped: 3 });
        assert_eq!(db.get_entry("2026-01-05").unwrap().unwrap().count, 0);
    }

    #[test]
    fn import_overwrites_existing_dates() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.save_entry("2026-01-01", 5, "old").unwrap();
        import_json(r#"[{"date":"2026-01-01","count":108,"notes":"new"}]"#, &db).unwrap();

        let entry = db.get_entry("2026-01-01").unwrap().unwrap();
        assert_eq!(entry.count, 108);
        assert_eq!(entry.notes, "new");
    }

    #[test]
    fn csv_header_is_detected_and_skipped() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_csv(
            "Date,Jaap Count,Notes\n2026-01-01,108,\"morning\"\n2026-01-02,216,\n",
            &db,
        )
        .unwrap();

        assert_eq!(report, ImportReport { imported: 2, skipped: 0 });
        assert_eq!(db.get_entry("2026-01-01").unwrap().unwrap().notes, "morning");
    }

    #[test]
    fn csv_without_header_imports_from_the_first_line() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_csv("2026-01-01,108,\n2026-01-02,216,\n", &db).unwrap();
        assert_eq!(report.imported, 2);
    }

    #[test]
    fn csv_bad_rows_are_counted_as_skipped() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let report = import_csv(
            "2026-01-01,108,\nnot-a-date,5,\n2026-01-03,abc,\nno-commas-here\n",
            &db,
        )
        .unwrap();

        assert_eq!(report, ImportReport { imported: 1, skipped: 3 });
    }

    #[test]
    fn csv_notes_keep_commas_and_quotes() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        import_csv(
            "2026-01-01,108,\"calm, steady \"\"morning\"\" sit\"\n",
            &db,
        )
        .unwrap();

        let entry = db.get_entry("2026-01-01").unwrap().unwrap();
        assert_eq!(entry.notes, "calm, steady \"morning\" sit");
    }

    #[test]
    fn csv_round_trip_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.save_entry("2026-01-01", 108, "with \"quotes\"").unwrap();
        db.save_entry("2026-01-02", 216, "a, comma").unwrap();
        db.save_entry("2026-01-03", 0, "").unwrap();

        let exported = export_csv(&db.get_all_entries().unwrap());

        let dir2 = TempDir::new().unwrap();
        let db2 = open_db(&dir2);
        let report = import_csv(&exported, &db2).unwrap();
        assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

        let original: Vec<(String, i64, String)> = db
            .get_all_entries()
            .unwrap()
            .into_iter()
            .map(|e| (e.date, e.count, e.notes))
            .collect();
        let reimported: Vec<(String, i64, String)> = db2
            .get_all_entries()
            .unwrap()
            .into_iter()
            .map(|e| (e.date, e.count, e.notes))
            .collect();
        assert_eq!(original, reimported);
    }

    #[test]
    fn json_export_carries_the_wrapper_fields() {
        let entries = vec![LedgerEntry {
            date: "2026-01-01".to_string(),
            count: 108,
            notes: "morning".to_string(),
            updated_at: "2026-01-01 06:00:00".to_string(),
            is_empty: false,
        }];
        let json = export_json(&entries, "2026-02-01T09:00:00+05:30").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["exportDate"], "2026-02-01T09:00:00+05:30");
        assert_eq!(value["totalEntries"], 1);
        assert_eq!(value["entries"][0]["date"], "2026-01-01");
        assert_eq!(value["entries"][0]["count"], 108);
        assert_eq!(value["entries"][0]["updatedAt"], "2026-01-01 06:00:00");
    }

    #[test]
    fn json_export_reimports_through_the_wrapper_shape() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);
        db.save_entry("2026-01-01", 108, "morning").unwrap();

        let exported = export_json(&db.get_all_entries().unwrap(), "2026-02-01T00:00:00Z").unwrap();

        let dir2 = TempDir::new().unwrap();
        let db2 = open_db(&dir2);
        let report = import_json(&exported, &db2).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(db2.get_entry("2026-01-01").unwrap().unwrap().notes, "morning");
    }
}
