pub mod antaryatra;
pub mod cli;
pub mod config;
pub mod database;
pub mod import_export;
pub mod ledger;
pub mod milestone;
pub mod models;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use models::{AntaryatraRecord, LedgerEntry, Sankalpa};
pub use utils::Profile;
