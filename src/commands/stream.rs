use anyhow::{Context, Result};
use retrofeed::{
    archive::{ArchiveClient, PaginationDriver},
    config::Config,
};
use std::sync::Arc;
use tracing::info;

use super::{print_item, print_json, OutputFormat};

pub async fn stream_feed(config: Config, pages: u32, format: OutputFormat) -> Result<()> {
    let client =
        ArchiveClient::new(config.archive.clone()).context("Failed to set up archive client")?;
    let mut driver = PaginationDriver::new(Arc::new(client), config.archive, &config.feed)?;

    info!("Streaming {} pages", pages);

    let mut shown = 0;
    for _ in 0..pages {
        let page = driver.next_page().await?;
        match format {
            OutputFormat::Json => print_json(&page)?,
            OutputFormat::Text => {
                println!("\n=== Page {} ({} items) ===\n", page.page, page.items.len());
                for item in &page.items {
                    shown += 1;
                    print_item(shown, item);
                    println!();
                }
            }
        }
    }

    Ok(())
}
