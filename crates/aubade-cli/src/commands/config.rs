use anyhow::Result;
use aubade_etl::{config, Config};
use std::path::PathBuf;

/// Show the current effective configuration.
pub fn show_config(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load_with_data_dir(data_dir)?;
    let config_path = config::config_file_path();

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    print!("{}", config.to_display_toml()?);

    let spotify = if config.spotify_credentials().is_some() {
        "enabled"
    } else {
        "disabled (no credentials)"
    };
    println!("\nSpotify lookups: {}", spotify);
    println!("\nPriority: CLI args > ENV vars > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure aubade.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
