use anyhow::{Context, Result};
use retrofeed::config::Config;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "retrofeed.toml";

pub fn init_config(path: PathBuf) -> Result<()> {
    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("Configuration file already exists: {}", config_path.display());
    }

    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;

    let body = toml::to_string_pretty(&Config::default()).context("Failed to render config")?;
    let toml_content = format!("# retrofeed configuration\n\n{}", body);

    std::fs::write(&config_path, toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
