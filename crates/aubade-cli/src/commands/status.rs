use anyhow::{Context, Result};
use aubade_core::store::{Catalog, CuratedLists};
use aubade_core::DataDir;
use aubade_etl::Config;

pub fn show_status(config: &Config, include_future: bool) -> Result<()> {
    let data_dir = DataDir::new(&config.data_dir);
    let catalog_path = data_dir.catalog_path();

    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to read catalog {}", catalog_path.display()))?;
    let store = data_dir.ledger_store();
    let ledger = store.load().context("Failed to read history")?;
    let archives = store.archives()?;
    let curated = CuratedLists::load(&data_dir.curated_lists_dir())?;

    let used = ledger.used_rows();
    let remaining = catalog
        .entries()
        .iter()
        .filter(|e| !used.contains(&e.row_id))
        .count();

    let today = chrono::Local::now().date_naive();
    let published = data_dir.record_store().list(today, include_future)?;

    println!("\nAubade Status\n");
    println!("  Data directory: {}", data_dir.root().display());
    println!("  Catalog albums: {}", catalog.len());
    println!("  Picked this round: {}", ledger.len());
    println!("  Remaining this round: {}", remaining);
    println!("  Archived rounds: {}", archives.len());
    println!("  Curated lists: {}", curated.slugs().join(", "));
    println!(
        "  Published records: {}{}",
        published.len(),
        if include_future { " (including future dates)" } else { "" }
    );

    match ledger.last() {
        Some(last) => println!(
            "  Last pick: {} - '{}' by '{}' ({})",
            last.date, last.title, last.artist, last.year
        ),
        None => println!("  Last pick: none"),
    }

    if catalog.is_empty() {
        println!("\n  The catalog is empty; add albums to {}", catalog_path.display());
    }

    Ok(())
}
