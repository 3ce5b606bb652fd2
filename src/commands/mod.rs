pub mod init;
pub mod item;
pub mod search;
pub mod serve;
pub mod stream;

use retrofeed::types::CanonicalItem;
use retrofeed::util::{format_year, truncate_str};

/// CLI output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print one item as a text block
pub(crate) fn print_item(index: usize, item: &CanonicalItem) {
    println!("[{}] {} ({})", index, item.title, format_year(item.year));
    println!("   Image:   {}", item.image_url);
    println!("   Archive: {}", item.archive_url);
    println!("   Wiki:    {}", item.reference_url);
    println!("   {}", truncate_str(&item.description, 200));
}

/// Print a serializable value as pretty JSON
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
