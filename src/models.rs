use serde::{Deserialize, Serialize};

/// A single day of practice. Keyed by `date`; saving is always an upsert,
/// so there is at most one entry per calendar day.
///
/// Serialized field names are camelCase to stay compatible with the
/// JSON interchange format used by import/export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub date: String, // ISO 8601: YYYY-MM-DD, local wall-clock day
    pub count: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub updated_at: String,
    /// True when this entry was synthesized as a placeholder for a day
    /// with no stored record. Never persisted.
    #[serde(skip)]
    pub is_empty: bool,
}

impl LedgerEntry {
    pub fn new(date: String, count: i64) -> Self {
        Self {
            date,
            count,
            notes: String::new(),
            updated_at: String::new(),
            is_empty: false,
        }
    }

    /// Placeholder for a day inside the recent window with no stored record.
    pub fn placeholder(date: String) -> Self {
        Self {
            date,
            count: 0,
            notes: String::new(),
            updated_at: String::new(),
            is_empty: true,
        }
    }
}

/// Entries for one calendar year with their running total. Derived, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearGroup {
    pub year: i32,
    pub year_total: i64,
    pub entries: Vec<LedgerEntry>,
}

/// The singleton vow of intent. Created once; a rewrite replaces `text`,
/// `context` and `updated_at` but preserves the original `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sankalpa {
    pub text: String,
    #[serde(default)]
    pub context: String,
    pub date: String, // date first established, never overwritten
    pub updated_at: String,
}

impl Sankalpa {
    pub fn new(text: String, context: String, today: String) -> Self {
        Self {
            text,
            context,
            date: today.clone(),
            updated_at: today,
        }
    }
}

/// Stored status of an annual reflection record. `Expired` is never stored;
/// it is derived from the window state at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntaryatraStatus {
    Pending,
    Recorded,
    Skipped,
}

impl AntaryatraStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AntaryatraStatus::Pending => "pending",
            AntaryatraStatus::Recorded => "recorded",
            AntaryatraStatus::Skipped => "skipped",
        }
    }
}

impl std::str::FromStr for AntaryatraStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AntaryatraStatus::Pending),
            "recorded" => Ok(AntaryatraStatus::Recorded),
            "skipped" => Ok(AntaryatraStatus::Skipped),
            other => Err(format!("unknown antaryatra status: {other}")),
        }
    }
}

/// One annual reflection, keyed by year. Once the status reaches
/// `Recorded` or `Skipped` the record is sealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntaryatraRecord {
    pub year: i32,
    pub status: AntaryatraStatus,
    #[serde(default)]
    pub text: String,
    pub recorded_on: String,
    /// Captured at write time, informational only.
    #[serde(default)]
    pub timezone: String,
}
