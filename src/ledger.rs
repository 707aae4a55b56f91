use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, Weekday};

use crate::models::{LedgerEntry, YearGroup};
use crate::utils::parse_date;

/// Today as YYYY-MM-DD in local wall-clock time, never UTC.
pub fn local_today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Whether the given ISO date falls on a Sunday. The string is decomposed
/// into a calendar date; parsing it as a UTC instant would shift the
/// weekday near midnight.
pub fn is_sunday(date: &str) -> bool {
    parse_date(date)
        .map(|d| d.weekday() == Weekday::Sun)
        .unwrap_or(false)
}

/// Merge stored entries with placeholders so that every day in the
/// inclusive 7-day window ending at `today` is present. Stored entries
/// override placeholders; entries older than the window pass through
/// unmodified. Returns a deduplicated list sorted by date descending.
pub fn fill_missing_dates(entries: &[LedgerEntry], today: &str) -> Vec<LedgerEntry> {
    let mut by_date: BTreeMap<String, LedgerEntry> = BTreeMap::new();

    for entry in entries {
        let mut entry = entry.clone();
        entry.is_empty = false;
        by_date.insert(entry.date.clone(), entry);
    }

    if let Ok(today) = parse_date(today) {
        for offset in 0..7 {
            let day = (today - Duration::days(offset)).format("%Y-%m-%d").to_string();
            by_date
                .entry(day.clone())
                .or_insert_with(|| LedgerEntry::placeholder(day));
        }
    }

    // BTreeMap iterates ascending; zero-padded ISO dates sort
    // lexicographically, so reversing gives newest first.
    by_date.into_values().rev().collect()
}

/// Partition entries into per-year buckets with running totals. Entry
/// order inside a bucket is preserved from the input; buckets are sorted
/// descending by year.
pub fn group_entries_by_year(entries: &[LedgerEntry]) -> Vec<YearGroup> {
    let mut groups: BTreeMap<i32, YearGroup> = BTreeMap::new();

    for entry in entries {
        let year: i32 = entry
            .date
            .get(..4)
            .and_then(|y| y.parse().ok())
            .unwrap_or(0);
        let group = groups.entry(year).or_insert_with(|| YearGroup {
            year,
            year_total: 0,
            entries: Vec::new(),
        });
        group.year_total += entry.count;
        group.entries.push(entry.clone());
    }

    groups.into_values().rev().collect()
}
