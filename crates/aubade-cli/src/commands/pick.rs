use anyhow::{Context, Result};
use aubade_core::select::pick_for_date;
use aubade_core::{DataDir, Error};
use aubade_etl::Config;

use super::parse_date;

pub fn run_pick(config: &Config, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let data_dir = DataDir::new(&config.data_dir);

    let (result, path) = match pick_for_date(&data_dir, date, &mut rand::rng()) {
        Ok(picked) => picked,
        Err(Error::EmptyCatalog) => {
            anyhow::bail!(
                "No albums in {}; nothing to pick",
                data_dir.catalog_path().display()
            );
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to pick an album from {}", data_dir.root().display())
            });
        }
    };

    log::info!("Wrote {}", path.display());
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
