use std::fs;
use std::path::Path;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::antaryatra;
use crate::database::{Database, DatabaseError};
use crate::import_export::{self, ImportError};
use crate::ledger;
use crate::milestone::{self, Chronological};
use crate::models::{AntaryatraRecord, AntaryatraStatus, Sankalpa};
use crate::utils::{format_indian_number, parse_date};

#[derive(Parser)]
#[command(name = "jaap")]
#[command(about = "Jaap Ledger - a daily practice tracker for the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record today's count (overwrites any entry for the same date)
    Log {
        /// Jaap count for the day
        count: i64,
        /// Date to record for (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the recent week, totals and milestone progress (default)
    Show,
    /// List all entries grouped by year
    Ledger,
    /// Show crore crossing history and the next-crore projection
    Milestones,
    /// View or establish the sankalpa
    Sankalpa {
        /// Establish (or rewrite) the vow text
        #[arg(long)]
        establish: Option<String>,
        /// Optional context for the vow
        #[arg(long)]
        context: Option<String>,
        /// Confirm rewriting an existing vow
        #[arg(long)]
        force: bool,
    },
    /// View or write the annual reflection
    Antaryatra {
        /// Reflection year (defaults to the year whose window is nearest)
        #[arg(long)]
        year: Option<i32>,
        /// Record the reflection text for the year
        #[arg(long)]
        record: Option<String>,
        /// Skip the reflection for the year
        #[arg(long)]
        skip: bool,
    },
    /// Import entries from a JSON or CSV file
    Import {
        /// Path to the file to import
        file: String,
        /// File format (inferred from the extension when omitted)
        #[arg(long)]
        format: Option<FileFormat>,
    },
    /// Export all entries to a JSON or CSV file
    Export {
        /// Path to write
        file: String,
        /// File format (inferred from the extension when omitted)
        #[arg(long)]
        format: Option<FileFormat>,
    },
    /// Delete the entry for a date
    Delete {
        /// Date to delete (YYYY-MM-DD)
        date: String,
    },
    /// List palettes or set the active one
    Palette {
        /// Palette name to activate
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),
    #[error("Failed to serialize export: {0}")]
    ExportError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Count must be non-negative, got {0}")]
    NegativeCount(i64),
    #[error("{0}")]
    InvalidArgument(String),
}

/// Handle the log command
pub fn handle_log(
    count: i64,
    date: Option<String>,
    notes: Option<String>,
    db: &Database,
) -> Result<(), CliError> {
    if count < 0 {
        return Err(CliError::NegativeCount(count));
    }

    let date = match date {
        Some(date_str) => {
            parse_date(&date_str).map_err(|e| {
                CliError::DateParseError(format!("Invalid date format '{}': {}", date_str, e))
            })?;
            date_str
        }
        None => ledger::local_today(),
    };

    db.save_entry(&date, count, notes.as_deref().unwrap_or(""))?;
    println!("Recorded {} for {}", format_indian_number(count), date);

    Ok(())
}

/// Handle the show command: recent week, total, milestone progress
pub fn handle_show(db: &Database) -> Result<(), CliError> {
    let entries = db.get_all_entries()?;
    let today = ledger::local_today();
    let recent = ledger::fill_missing_dates(&entries, &today);

    println!("Last 7 days:");
    for entry in recent.iter().take(7) {
        let sunday = if ledger::is_sunday(&entry.date) {
            "  (Sunday)"
        } else {
            ""
        };
        if entry.is_empty {
            println!("  {}  {:>12}{}", entry.date, "\u{2014}", sunday);
        } else {
            let notes = if entry.notes.is_empty() {
                String::new()
            } else {
                format!("  \u{2013} {}", entry.notes)
            };
            println!(
                "  {}  {:>12}{}{}",
                entry.date,
                format_indian_number(entry.count),
                sunday,
                notes
            );
        }
    }

    let total: i64 = entries.iter().map(|e| e.count).sum();
    let bracket = milestone::current_milestone(total);
    println!();
    println!("Total jaap: {}", format_indian_number(total));
    println!(
        "Crores completed: {}  ({:.1}% towards crore {})",
        bracket.current,
        milestone::milestone_progress(total),
        bracket.next
    );

    let chronological = Chronological::from_descending(entries);
    if let Some(prediction) =
        milestone::predict_next_milestone(total, &chronological, Local::now().date_naive())
    {
        println!(
            "At {} per day (last {} practiced days), crore {} lands around {} ({} days to go)",
            format_indian_number(prediction.average_per_day),
            prediction.based_on_days,
            bracket.next,
            prediction.predicted_date,
            prediction.days_remaining
        );
    }

    Ok(())
}

/// Handle the ledger command: all entries grouped by year
pub fn handle_ledger(db: &Database) -> Result<(), CliError> {
    let entries = db.get_all_entries()?;
    if entries.is_empty() {
        println!("No entries yet. Record one with `jaap log <count>`.");
        return Ok(());
    }

    for group in ledger::group_entries_by_year(&entries) {
        println!("{}  (total {})", group.year, format_indian_number(group.year_total));
        for entry in &group.entries {
            let sunday = if ledger::is_sunday(&entry.date) {
                "  (Sunday)"
            } else {
                ""
            };
            let notes = if entry.notes.is_empty() {
                String::new()
            } else {
                format!("  \u{2013} {}", entry.notes)
            };
            println!(
                "  {}  {:>12}{}{}",
                entry.date,
                format_indian_number(entry.count),
                sunday,
                notes
            );
        }
        println!();
    }

    Ok(())
}

/// Handle the milestones command
pub fn handle_milestones(db: &Database) -> Result<(), CliError> {
    let entries = db.get_all_entries()?;
    let total: i64 = entries.iter().map(|e| e.count).sum();
    let chronological = Chronological::from_descending(entries);

    let history = milestone::milestone_history(&chronological);
    if history.is_empty() {
        println!("No crore crossed yet.");
    } else {
        println!("Crossings:");
        for crossing in &history {
            match crossing.days_since_previous {
                Some(days) => println!(
                    "  crore {:>2}  {}  ({} days since the previous)",
                    crossing.crore, crossing.date, days
                ),
                None => println!("  crore {:>2}  {}", crossing.crore, crossing.date),
            }
        }
    }

    let bracket = milestone::current_milestone(total);
    println!();
    println!(
        "Next: crore {} at {} total ({:.1}% there)",
        bracket.next,
        format_indian_number(bracket.next_total),
        milestone::milestone_progress(total)
    );
    match milestone::predict_next_milestone(total, &chronological, Local::now().date_naive()) {
        Some(prediction) => println!(
            "Projected for {} at {} per day over the last {} practiced days",
            prediction.predicted_date,
            format_indian_number(prediction.average_per_day),
            prediction.based_on_days
        ),
        None => println!("No projection yet; record some practice first."),
    }

    Ok(())
}

/// Handle the sankalpa command: view, establish, or rewrite the vow
pub fn handle_sankalpa(
    establish: Option<String>,
    context: Option<String>,
    force: bool,
    db: &Database,
) -> Result<(), CliError> {
    let existing = db.get_sankalpa()?;

    let Some(text) = establish else {
        match existing {
            Some(sankalpa) => {
                println!("{}", sankalpa.text);
                if !sankalpa.context.is_empty() {
                    println!("  {}", sankalpa.context);
                }
                println!("Established {}", sankalpa.date);
                if sankalpa.updated_at != sankalpa.date {
                    println!("Last rewritten {}", sankalpa.updated_at);
                }
            }
            None => println!("No sankalpa established yet. Use `jaap sankalpa --establish \"...\"`."),
        }
        return Ok(());
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(CliError::InvalidArgument(
            "the sankalpa text must not be empty".to_string(),
        ));
    }
    if existing.is_some() && !force {
        return Err(CliError::InvalidArgument(
            "a sankalpa is already established; pass --force to rewrite it \
             (the original establishment date is preserved)"
                .to_string(),
        ));
    }

    let today = ledger::local_today();
    let record = match existing {
        // Rewrite keeps the original establishment date
        Some(original) => Sankalpa {
            text,
            context: context.map(|c| c.trim().to_string()).unwrap_or(original.context),
            date: original.date,
            updated_at: today,
        },
        None => Sankalpa::new(
            text,
            context.map(|c| c.trim().to_string()).unwrap_or_default(),
            today,
        ),
    };
    db.save_sankalpa(&record)?;
    println!("Sankalpa established ({}).", record.date);

    Ok(())
}

/// Handle the antaryatra command: view records, or write one for a year
/// while its window is open
pub fn handle_antaryatra(
    year: Option<i32>,
    record: Option<String>,
    skip: bool,
    db: &Database,
) -> Result<(), CliError> {
    let now = Local::now().naive_local();
    let today = now.date();
    // In December the open window belongs to the current year; for the
    // rest of the year the nearest window is last year's.
    let year = year.unwrap_or_else(|| {
        if today.month() == 12 {
            today.year()
        } else {
            today.year() - 1
        }
    });

    if record.is_some() && skip {
        return Err(CliError::InvalidArgument(
            "--record and --skip are mutually exclusive".to_string(),
        ));
    }

    let stored = db.get_antaryatra(year)?;

    if record.is_some() || skip {
        if !antaryatra::can_record(stored.as_ref(), year, now) {
            let status = antaryatra::effective_status(stored.as_ref(), year, now);
            return Err(CliError::InvalidArgument(format!(
                "the {} reflection cannot be written now (status: {}); \
                 the window runs Dec 31 through Jan 13",
                year,
                status.as_str()
            )));
        }

        let (status, text) = match record {
            Some(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(CliError::InvalidArgument(
                        "the reflection text must not be empty".to_string(),
                    ));
                }
                (AntaryatraStatus::Recorded, text)
            }
            None => (AntaryatraStatus::Skipped, String::new()),
        };

        db.save_antaryatra(&AntaryatraRecord {
            year,
            status,
            text,
            recorded_on: ledger::local_today(),
            timezone: antaryatra::local_timezone(),
        })?;
        match status {
            AntaryatraStatus::Skipped => println!("Reflection for {} skipped.", year),
            _ => println!("Reflection for {} recorded and sealed.", year),
        }
        return Ok(());
    }

    // View mode
    let status = antaryatra::effective_status(stored.as_ref(), year, now);
    println!("Antaryātrā {}: {}", year, status.as_str());

    let entries = db.get_all_entries()?;
    let stats = antaryatra::year_stats(&entries, year);
    println!(
        "  {} days of practice, {} per day on average",
        stats.days_of_practice,
        format_indian_number(stats.average_per_day)
    );

    if antaryatra::is_reflection_day(year, today) {
        println!("  Today is the reflection day for {}.", year);
    }
    if antaryatra::should_show_reminder(stored.as_ref(), year, now) {
        println!("  The window is open until Jan 13; record with `jaap antaryatra --record \"...\"`.");
    }

    let archive = db.get_all_antaryatra()?;
    if !archive.is_empty() {
        println!();
        println!("Archive:");
        for record in &archive {
            match record.status {
                AntaryatraStatus::Recorded => {
                    println!("  {}  recorded on {}", record.year, record.recorded_on);
                    println!("    {}", record.text);
                }
                AntaryatraStatus::Skipped => {
                    println!("  {}  skipped on {}", record.year, record.recorded_on)
                }
                AntaryatraStatus::Pending => println!("  {}  pending", record.year),
            }
        }
    }

    Ok(())
}

/// Handle the import command
pub fn handle_import(
    file: String,
    format: Option<FileFormat>,
    db: &Database,
) -> Result<(), CliError> {
    let format = resolve_format(&file, format)?;
    let text = fs::read_to_string(&file)?;

    let report = match format {
        FileFormat::Json => import_export::import_json(&text, db)?,
        FileFormat::Csv => import_export::import_csv(&text, db)?,
    };

    if report.skipped > 0 {
        println!(
            "Imported {} entries ({} skipped — invalid format)",
            report.imported, report.skipped
        );
    } else {
        println!("Imported {} entries", report.imported);
    }

    Ok(())
}

/// Handle the export command
pub fn handle_export(
    file: String,
    format: Option<FileFormat>,
    db: &Database,
) -> Result<(), CliError> {
    let format = resolve_format(&file, format)?;
    let entries = db.get_all_entries()?;

    let content = match format {
        FileFormat::Csv => import_export::export_csv(&entries),
        FileFormat::Json => {
            import_export::export_json(&entries, &Local::now().to_rfc3339())?
        }
    };
    fs::write(&file, content)?;
    println!("Exported {} entries to {}", entries.len(), file);

    Ok(())
}

/// Handle the delete command
pub fn handle_delete(date: String, db: &Database) -> Result<(), CliError> {
    parse_date(&date)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date, e)))?;
    db.delete_entry(&date)?;
    println!("Deleted entry for {}", date);

    Ok(())
}

/// Resolve the file format from an explicit flag or the file extension
fn resolve_format(file: &str, format: Option<FileFormat>) -> Result<FileFormat, CliError> {
    if let Some(format) = format {
        return Ok(format);
    }
    match Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("json") => Ok(FileFormat::Json),
        Some("csv") => Ok(FileFormat::Csv),
        _ => Err(CliError::InvalidArgument(format!(
            "cannot infer the format of '{}'; pass --format json or --format csv",
            file
        ))),
    }
}
