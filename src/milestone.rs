use chrono::{Duration, NaiveDate};

use crate::models::LedgerEntry;
use crate::utils::parse_date;

/// Threshold unit: one crore = ten million, matching the Indian
/// numbering convention used for display.
pub const CRORE: i64 = 10_000_000;

/// The crore bracket a running total sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub current: i64,
    pub next: i64,
    pub next_total: i64,
}

/// One threshold crossing in the ledger's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneCrossing {
    pub crore: i64,
    pub date: String,
    /// Whole days since the previous crossing, `None` for the first ever.
    pub days_since_previous: Option<i64>,
}

/// Projection of when the next crore will be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonePrediction {
    pub average_per_day: i64,
    pub days_remaining: i64,
    pub predicted_date: String,
    pub based_on_days: usize,
}

/// Entries in ascending date order, oldest first.
///
/// The milestone walk is only correct over chronologically ordered input;
/// the store hands lists out newest-first, so construction forces the
/// caller to say which order it has.
#[derive(Debug, Clone)]
pub struct Chronological(Vec<LedgerEntry>);

impl Chronological {
    pub fn from_ascending(entries: Vec<LedgerEntry>) -> Self {
        Chronological(entries)
    }

    pub fn from_descending(mut entries: Vec<LedgerEntry>) -> Self {
        entries.reverse();
        Chronological(entries)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.0
    }
}

pub fn current_milestone(total: i64) -> Milestone {
    let current = total / CRORE;
    Milestone {
        current,
        next: current + 1,
        next_total: (current + 1) * CRORE,
    }
}

/// Progress through the current crore as a percentage in `[0, 100)`.
/// Exactly 0 on a crore boundary, not 100.
pub fn milestone_progress(total: i64) -> f64 {
    (total % CRORE) as f64 / CRORE as f64 * 100.0
}

/// Walk the ledger oldest-first and record every crore crossing. A single
/// large entry can cross several thresholds; one item is emitted per
/// threshold, all tagged with that entry's date. Zero-count entries
/// advance the running total by nothing and cannot trigger a crossing.
pub fn milestone_history(entries: &Chronological) -> Vec<MilestoneCrossing> {
    let mut history: Vec<MilestoneCrossing> = Vec::new();
    let mut running_total = 0i64;
    let mut current_crore = 0i64;

    for entry in entries.entries() {
        running_total += entry.count;
        let new_crore = running_total / CRORE;

        if new_crore > current_crore {
            for crore in (current_crore + 1)..=new_crore {
                let days_since_previous = history.last().and_then(|previous| {
                    match (parse_date(&previous.date), parse_date(&entry.date)) {
                        (Ok(prev), Ok(this)) => Some((this - prev).num_days()),
                        _ => None,
                    }
                });
                history.push(MilestoneCrossing {
                    crore,
                    date: entry.date.clone(),
                    days_since_previous,
                });
            }
            current_crore = new_crore;
        }
    }

    history
}

/// Project the date of the next crore crossing from the trailing average
/// of the last 30 practiced days. Returns `None` when there is nothing
/// to average. `today` is supplied by the caller so the projection is
/// deterministic under test.
pub fn predict_next_milestone(
    total: i64,
    entries: &Chronological,
    today: NaiveDate,
) -> Option<MilestonePrediction> {
    let practiced: Vec<&LedgerEntry> = entries.entries().iter().filter(|e| e.count > 0).collect();
    let recent = &practiced[practiced.len().saturating_sub(30)..];
    if recent.is_empty() {
        return None;
    }

    let total_recent: i64 = recent.iter().map(|e| e.count).sum();
    let average_per_day = (total_recent as f64 / recent.len() as f64).round() as i64;
    if average_per_day == 0 {
        return None;
    }

    let next_total = (total / CRORE + 1) * CRORE;
    let remaining = next_total - total;
    let days_remaining = (remaining as f64 / average_per_day as f64).ceil() as i64;
    let predicted = today + Duration::days(days_remaining);

    Some(MilestonePrediction {
        average_per_day,
        days_remaining,
        predicted_date: predicted.format("%Y-%m-%d").to_string(),
        based_on_days: recent.len(),
    })
}
