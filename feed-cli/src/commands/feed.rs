//! List photos from the feed.

use anyhow::{Context, Result};
use photofeed_types::Photo;

use crate::config::CliConfig;

/// Run the feed command, loading `pages` pages in order.
pub async fn run(config: &CliConfig, pages: u32) -> Result<()> {
    let session = super::open_session(config)?;

    for _ in 0..pages.max(1) {
        let added = session
            .feed()
            .fetch_next_page()
            .await
            .with_context(|| format!("Failed to load page {}", session.feed().next_page()))?;
        // End of feed
        if added == Some(0) {
            break;
        }
    }

    for photo in session.feed().photos() {
        println!("{}", format_photo(&photo));
    }
    println!();
    println!(
        "{} photos, next page {}",
        session.feed().len(),
        session.feed().next_page()
    );
    Ok(())
}

fn format_photo(photo: &Photo) -> String {
    let liked = if photo.is_liked { "*" } else { " " };
    let date = photo
        .created_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".into());
    let description = photo.description.as_deref().unwrap_or("");
    format!(
        "{liked} {:<12} {date} {:>5}x{:<5} {description}",
        photo.id.as_str(),
        photo.size.width,
        photo.size.height
    )
}
