//! Annual reflection window logic.
//!
//! All calculations are in local wall-clock time. Every function takes the
//! current instant as a parameter rather than reading a clock, so the window
//! state is deterministic under test; production callers pass
//! `Local::now().naive_local()`.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::models::{AntaryatraRecord, AntaryatraStatus, LedgerEntry};

/// Effective state of a reflection year, merging the stored record (which
/// may be absent) with the computed window state. `Expired` exists only
/// here, never in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveStatus {
    Pending,
    Recorded,
    Skipped,
    Expired,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Pending => "pending",
            EffectiveStatus::Recorded => "recorded",
            EffectiveStatus::Skipped => "skipped",
            EffectiveStatus::Expired => "expired",
        }
    }
}

/// Practice summary for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearStats {
    pub days_of_practice: usize,
    pub average_per_day: i64,
}

/// The reflection window for year `Y`:
/// opens Dec 31 of `Y` at 00:00:00, closes Jan 13 of `Y+1` at 23:59:59,
/// both ends inclusive (14 calendar days).
pub fn reflection_window(year: i32) -> (NaiveDateTime, NaiveDateTime) {
    let opens = NaiveDate::from_ymd_opt(year, 12, 31)
        .expect("Dec 31 exists in every year")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");
    let closes = NaiveDate::from_ymd_opt(year + 1, 1, 13)
        .expect("Jan 13 exists in every year")
        .and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid time");
    (opens, closes)
}

pub fn is_window_open(year: i32, now: NaiveDateTime) -> bool {
    let (opens, closes) = reflection_window(year);
    now >= opens && now <= closes
}

pub fn is_window_expired(year: i32, now: NaiveDateTime) -> bool {
    let (_, closes) = reflection_window(year);
    now > closes
}

/// Whether `today` is Dec 31 of the given year exactly. Drives reminder
/// triggers, not write gating.
pub fn is_reflection_day(year: i32, today: NaiveDate) -> bool {
    today.year() == year && today.month() == 12 && today.day() == 31
}

/// Resolve the effective status for year `Y`. A stored `Recorded` or
/// `Skipped` is terminal and returned verbatim regardless of the clock;
/// an absent or stored-pending record resolves against the window.
pub fn effective_status(
    record: Option<&AntaryatraRecord>,
    year: i32,
    now: NaiveDateTime,
) -> EffectiveStatus {
    match record.map(|r| r.status) {
        Some(AntaryatraStatus::Recorded) => EffectiveStatus::Recorded,
        Some(AntaryatraStatus::Skipped) => EffectiveStatus::Skipped,
        Some(AntaryatraStatus::Pending) | None => {
            if is_window_expired(year, now) {
                EffectiveStatus::Expired
            } else {
                EffectiveStatus::Pending
            }
        }
    }
}

/// Whether a reflection may be written for year `Y` right now: the window
/// must be open and nothing terminal recorded yet. Callers must check this
/// before writing; storage does not enforce it.
pub fn can_record(record: Option<&AntaryatraRecord>, year: i32, now: NaiveDateTime) -> bool {
    is_window_open(year, now) && effective_status(record, year, now) == EffectiveStatus::Pending
}

/// Same gate as [`can_record`], kept as its own entry point for the
/// reminder nudge call site.
pub fn should_show_reminder(
    record: Option<&AntaryatraRecord>,
    year: i32,
    now: NaiveDateTime,
) -> bool {
    can_record(record, year, now)
}

/// Days of practice and rounded average for one year, counting only
/// entries with a positive count.
pub fn year_stats(entries: &[LedgerEntry], year: i32) -> YearStats {
    let prefix = year.to_string();
    let counts: Vec<i64> = entries
        .iter()
        .filter(|e| e.date.starts_with(&prefix) && e.count > 0)
        .map(|e| e.count)
        .collect();

    let days_of_practice = counts.len();
    if days_of_practice == 0 {
        return YearStats {
            days_of_practice: 0,
            average_per_day: 0,
        };
    }

    let total: i64 = counts.iter().sum();
    YearStats {
        days_of_practice,
        average_per_day: (total as f64 / days_of_practice as f64).round() as i64,
    }
}

/// Timezone label captured on reflection records, informational only.
/// `$TZ` when set, otherwise the local UTC offset.
pub fn local_timezone() -> String {
    std::env::var("TZ").unwrap_or_else(|_| format!("UTC{}", Local::now().format("%:z")))
}
