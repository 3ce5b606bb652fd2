use anyhow::{Context, Result};
use retrofeed::{config::Config, service::ArchiveService};
use tracing::info;

use super::{print_item, print_json, OutputFormat};

pub async fn search_archive(
    config: Config,
    query: String,
    page: u32,
    format: OutputFormat,
) -> Result<()> {
    info!("Searching archive for: {} (page {})", query, page);

    let service =
        ArchiveService::from_config(config.archive).context("Failed to set up archive client")?;
    let results = service.search(&query, page).await?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Text => {
            println!("\nSearch Results ({} items):\n", results.total);
            for (i, item) in results.items.iter().enumerate() {
                print_item(i + 1, item);
                println!();
            }
        }
    }

    Ok(())
}
