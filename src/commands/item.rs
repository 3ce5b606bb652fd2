use anyhow::{Context, Result};
use retrofeed::{config::Config, service::ArchiveService, util::format_year};

use super::{print_json, OutputFormat};

pub async fn show_item(config: Config, url: String, format: OutputFormat) -> Result<()> {
    let service =
        ArchiveService::from_config(config.archive).context("Failed to set up archive client")?;

    let Some(details) = service.item_details(&url).await? else {
        anyhow::bail!("Failed to fetch item page: {}", url);
    };

    match format {
        OutputFormat::Json => print_json(&details)?,
        OutputFormat::Text => {
            println!("{} ({})", details.title, format_year(details.year));
            if let Some(image) = &details.image_url {
                println!("   Image: {}", image);
            }
            println!("   Wiki:  {}", details.reference_url);
            println!("   {}", details.description);
        }
    }

    Ok(())
}
