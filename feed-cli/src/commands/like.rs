//! Like or unlike a photo.

use anyhow::{Context, Result};
use photofeed_types::PhotoId;

use crate::config::CliConfig;

/// Run the like (`liked = true`) or unlike command.
pub async fn run(config: &CliConfig, id: &str, liked: bool) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("Photo id is empty");
    }

    let session = super::open_session(config)?;
    if !session.is_authenticated() {
        anyhow::bail!("Not signed in. Run 'feed-cli login' first.");
    }

    let verb = if liked { "Liked" } else { "Unliked" };
    session
        .feed()
        .set_liked(PhotoId::new(id), liked)
        .await
        .with_context(|| format!("Failed to update like for {id}"))?;

    println!("{verb} {id}");
    Ok(())
}
