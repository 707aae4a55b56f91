use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

/// Get the configuration directory path.
/// If profile is Dev, uses "jaap-ledger-dev" instead of "jaap-ledger"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "jaap-ledger-dev",
        Profile::Prod => "jaap-ledger",
    };
    ProjectDirs::from("com", "jaap-ledger", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path.
/// If profile is Dev, uses "jaap-ledger-dev" instead of "jaap-ledger"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "jaap-ledger-dev",
        Profile::Prod => "jaap-ledger",
    };
    ProjectDirs::from("com", "jaap-ledger", app_name).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Format an integer with Indian digit grouping: the last three digits,
/// then repeating groups of two (lakh/crore convention).
///
/// 10000000 -> "1,00,00,000", 5515238 -> "55,15,238", 0 -> "0".
pub fn format_indian_number(number: i64) -> String {
    if number == 0 {
        return "0".to_string();
    }

    let digits = number.unsigned_abs().to_string();

    let formatted = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        // Groups of two, right to left, over everything before the last three digits
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while !rest.is_empty() {
            let cut = rest.len().saturating_sub(2);
            groups.push(&rest[cut..]);
            rest = &rest[..cut];
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    if number < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_plain() {
        assert_eq!(format_indian_number(0), "0");
    }

    #[test]
    fn small_numbers_have_no_separators() {
        assert_eq!(format_indian_number(7), "7");
        assert_eq!(format_indian_number(999), "999");
    }

    #[test]
    fn thousands_split_after_three_digits() {
        assert_eq!(format_indian_number(1000), "1,000");
        assert_eq!(format_indian_number(55238), "55,238");
    }

    #[test]
    fn lakhs_and_crores_group_by_two() {
        assert_eq!(format_indian_number(100000), "1,00,000");
        assert_eq!(format_indian_number(5515238), "55,15,238");
        assert_eq!(format_indian_number(10000000), "1,00,00,000");
        assert_eq!(format_indian_number(123456789), "12,34,56,789");
    }

    #[test]
    fn negative_numbers_keep_the_sign() {
        assert_eq!(format_indian_number(-5515238), "-55,15,238");
        assert_eq!(
            format_indian_number(-10000000),
            format!("-{}", format_indian_number(10000000))
        );
    }

    #[test]
    fn parse_date_accepts_iso() {
        assert!(parse_date("2026-02-27").is_ok());
        assert!(parse_date("27/02/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }
}
