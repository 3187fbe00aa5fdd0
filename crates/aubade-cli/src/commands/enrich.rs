use anyhow::{Context, Result};
use aubade_etl::{Config, EnrichStage};
use std::path::Path;

pub async fn run_enrich(config: &Config, record: &Path) -> Result<()> {
    let stage = EnrichStage::new(config).context("Failed to set up enrichment")?;
    log::info!("Enrichment sources enabled: {}", stage.enabled_sources().join(", "));

    let enriched = stage
        .enrich_file(record)
        .await
        .with_context(|| format!("Failed to enrich {}", record.display()))?;

    let ids = enriched.external_ids.unwrap_or_default();
    println!("Enriched {}", record.display());
    println!("  {} by {} ({})", enriched.title, enriched.artist, enriched.year);
    println!("  MusicBrainz: {}", ids.musicbrainz.as_deref().unwrap_or("<not found>"));
    println!("  Spotify:     {}", ids.spotify.as_deref().unwrap_or("<not found>"));
    println!("  Genres:      {}", enriched.genres.unwrap_or_default().join(", "));
    println!("  Cover art:   {}", enriched.cover_art.as_deref().unwrap_or("<none>"));
    println!(
        "  Description: {}",
        if enriched.description.is_some() { "yes" } else { "no" }
    );

    Ok(())
}
