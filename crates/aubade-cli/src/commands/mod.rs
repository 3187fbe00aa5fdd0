pub mod caption;
pub mod config;
pub mod enrich;
pub mod pick;
pub mod status;

pub use caption::print_caption;
pub use enrich::run_enrich;
pub use pick::run_pick;
pub use status::show_status;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-06-12").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap()
        );
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("12.6.2025").is_err());
        assert!(parse_date("").is_err());
    }
}
