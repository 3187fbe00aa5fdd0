use anyhow::{Context, Result};
use aubade_core::content::Platform;
use aubade_core::store::records::read_record;
use chrono::NaiveDate;
use std::path::Path;

use super::parse_date;

pub fn print_caption(
    record: &Path,
    platform: Platform,
    max_chars: Option<usize>,
    url: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let album = read_record(record)
        .with_context(|| format!("Failed to read {}", record.display()))?;
    let date = match date {
        Some(date) => parse_date(date)?,
        None => record_date(record).with_context(|| {
            format!("Cannot tell the date of {}; pass --date", record.display())
        })?,
    };

    println!("{}", platform.caption(&album, date, url, max_chars));
    Ok(())
}

/// The date encoded in a `<YYYY-MM-DD>.json` record file name.
fn record_date(path: &Path) -> Result<NaiveDate> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Record path has no file name")?;
    parse_date(stem)
}
